/**
 * Streaming translation of the constrained HTML subset used in question text into
 * LaTeX fragments.
 *
 * The translator consumes a start-tag/end-tag/data event stream and emits LaTeX
 * group delimiters immediately on tag boundaries, without keeping a tag stack or
 * verifying balance. Malformed or overlapping markup therefore produces malformed
 * LaTeX; the contract is best-effort transformation, not validation.
 */
use regex::Regex;


/// The tags that are dropped entirely, keeping only their inner text.
const IGNORED_TAGS: [&str; 19] = [
    "td", "tr", "th", "thead", "table", "head", "body", "meta", "html", "tbody",
    "title", "script", "div", "span", "link", "header", "h5", "style", "font",
];

enum Token<'a> {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
        /// The exact text of the tag, including the angle brackets.
        raw: &'a str,
        self_closing: bool,
    },
    End {
        name: String,
    },
    Data(&'a str),
}


/// Convert some HTML to LaTeX. The markup should be relatively simple; see the
/// module documentation for the limits of the streaming model.
pub fn translate(markup: &str) -> String {
    translate_verbose(markup, false)
}

/// Like `translate`, but trace unrecognized tags to standard error.
pub fn translate_verbose(markup: &str, verbose: bool) -> String {
    let mut output = String::new();
    for token in TagScanner::new(markup) {
        match token {
            Token::Data(text) => {
                output.push_str(text);
            },
            Token::Start { ref name, ref attrs, raw, self_closing } => {
                start_tag(&mut output, name, attrs, raw, verbose);
                // A self-closing tag counts as a start tag immediately followed by
                // an end tag.
                if self_closing {
                    end_tag(&mut output, name, verbose);
                }
            },
            Token::End { ref name } => {
                end_tag(&mut output, name, verbose);
            },
        }
    }
    output
}

fn start_tag(
    output: &mut String, tag: &str, attrs: &[(String, String)], raw: &str, verbose: bool
) {
    match tag {
        "img" => {
            let mut filename = "";
            let mut dimensions = Vec::new();
            for (key, value) in attrs.iter() {
                if key == "src" {
                    filename = value.as_str();
                }
                if key == "height" {
                    dimensions.push(height_to_latex(value));
                }
                if key == "width" {
                    dimensions.push(width_to_latex(value));
                }
            }
            output.push_str(r"\includegraphics");
            if !dimensions.is_empty() {
                output.push_str(&format!("[{}]", dimensions.join(", ")));
            }
            output.push_str(&format!("{{{}}}", filename));
        },
        "hr" => {
            output.push('\n');
            output.push_str(r"\par\noindent\rule{\textwidth}{0.4pt}");
            output.push('\n');
        },
        "b" => output.push_str(r"{\bf "),
        "i" => output.push_str(r"{\it "),
        "em" => output.push_str(r"{\em "),
        "u" => output.push_str(r"\underline{"),
        "tt" => output.push_str(r"\texttt{"),
        "br" => output.push_str("\n\n"),
        "p" => output.push('\n'),
        "h1" => output.push_str(r"{\Large\bf "),
        "h2" => output.push_str(r"{\large\bf "),
        "h3" => output.push_str(r"{\bf\it "),
        "h4" => output.push_str(r"{\bf "),
        "ul" => {
            output.push_str(r"\begin{itemize}");
            output.push('\n');
        },
        "ol" => {
            output.push_str(r"\begin{enumerate}");
            output.push('\n');
        },
        "li" => output.push_str(r"\item "),
        "a" => {
            let target = attrs
                .iter()
                .find(|(key, _)| key == "href")
                .map(|(_, value)| value.as_str())
                .unwrap_or("");
            output.push_str(&format!(r"\href{{{}}}{{", target));
        },
        _ if IGNORED_TAGS.contains(&tag) => {},
        _ => {
            // A tag we don't know about. It might be inline math and not a tag at
            // all, so reinsert it verbatim; if a valid tag is nested inside it, the
            // recursive translation catches it.
            output.push('<');
            output.push_str(&translate_verbose(&raw[1..], verbose));
            if verbose {
                eprintln!("opening tag <{}> ignored. Exact text:", tag);
                eprintln!("  \"{}\"", raw);
            }
        },
    }
}

fn end_tag(output: &mut String, tag: &str, verbose: bool) {
    match tag {
        "b" | "i" | "u" | "a" | "em" | "tt" => output.push_str("} "),
        "h1" | "h2" | "h3" | "h4" => output.push_str("}\n"),
        "p" | "li" => output.push('\n'),
        "ul" => {
            output.push_str(r"\end{itemize}");
            output.push('\n');
        },
        "ol" => {
            output.push_str(r"\end{enumerate}");
            output.push('\n');
        },
        _ if IGNORED_TAGS.contains(&tag) => {},
        _ => {
            output.push_str(&format!("</{}> ", tag));
            if verbose {
                eprintln!("closing tag </{}> ignored.", tag);
            }
        },
    }
}

/// Convert an HTML `width` attribute value to a LaTeX `\includegraphics` option.
/// Percentages become fractions of `\textwidth` and pixel counts are scaled to
/// points at 0.75pt per pixel; anything else passes through verbatim.
fn width_to_latex(value: &str) -> String {
    if let Some(percent) = value.strip_suffix('%') {
        if let Ok(n) = percent.trim().parse::<i64>() {
            return format!("width={:.2}\\textwidth", n as f64 * 0.01);
        }
    }
    if let Some(pixels) = value.strip_suffix("px") {
        if let Ok(n) = pixels.trim().parse::<i64>() {
            return format!("width={}pt", (n as f64 * 0.75).round() as i64);
        }
    }
    format!("width={}", value)
}

/// As `width_to_latex`, but relative to `\textheight`.
fn height_to_latex(value: &str) -> String {
    if let Some(percent) = value.strip_suffix('%') {
        if let Ok(n) = percent.trim().parse::<i64>() {
            return format!("height={:.2}\\textheight", n as f64 * 0.01);
        }
    }
    if let Some(pixels) = value.strip_suffix("px") {
        if let Ok(n) = pixels.trim().parse::<i64>() {
            return format!("height={}pt", (n as f64 * 0.75).round() as i64);
        }
    }
    format!("height={}", value)
}

/// Return the local file paths referenced by `<img src="...">` tags in `text`, in
/// order of appearance. Sources are assumed to be local files, not URLs, and `src`
/// must be the first attribute of the tag.
pub fn image_refs(text: &str) -> Vec<String> {
    let pattern = Regex::new(r#"<img\s*src=(?:"([^"]*)"|'([^']*)')"#).unwrap();
    pattern
        .captures_iter(text)
        .filter_map(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().to_string())
        })
        .collect()
}


struct TagScanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TagScanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }
}

impl<'a> Iterator for TagScanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let rest = self.rest();
        if rest.is_empty() {
            return None;
        }

        if let Some(stripped) = rest.strip_prefix('<') {
            if stripped.starts_with('/') {
                // An end tag: everything up to the closing bracket.
                if let Some(close) = rest.find('>') {
                    let interior = &rest[2..close];
                    self.pos += close + 1;
                    let name = interior
                        .split_whitespace()
                        .next()
                        .unwrap_or("")
                        .to_lowercase();
                    return Some(Token::End { name });
                }
            } else if stripped.starts_with(|c: char| c.is_ascii_alphabetic()) {
                if let Some(close) = rest.find('>') {
                    let raw = &rest[..close + 1];
                    self.pos += close + 1;
                    let (name, attrs, self_closing) = parse_start_tag(&raw[1..close]);
                    return Some(Token::Start { name, attrs, raw, self_closing });
                }
            }
            // Not a plausible tag (or no closing bracket before the end of input):
            // hand the bracket back as data and carry on after it.
            self.pos += 1;
            return Some(Token::Data(&rest[..1]));
        }

        // Plain data up to the next bracket.
        let end = rest.find('<').unwrap_or_else(|| rest.len());
        self.pos += end;
        Some(Token::Data(&rest[..end]))
    }
}

/// Split the interior of a start tag (without the angle brackets) into a lowercase
/// tag name, a list of attributes in source order, and a self-closing flag.
fn parse_start_tag(interior: &str) -> (String, Vec<(String, String)>, bool) {
    let trimmed = interior.trim_end();
    let self_closing = trimmed.ends_with('/');
    let trimmed = trimmed.trim_end_matches('/');

    let name_end = trimmed
        .find(|c: char| c.is_whitespace())
        .unwrap_or_else(|| trimmed.len());
    let name = trimmed[..name_end].to_lowercase();

    let mut attrs = Vec::new();
    let mut chars = trimmed[name_end..].char_indices().peekable();
    let body = &trimmed[name_end..];
    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        // Attribute name runs up to '=', whitespace or the end of the tag.
        let mut key_end = body.len();
        while let Some(&(i, c)) = chars.peek() {
            if c == '=' || c.is_whitespace() {
                key_end = i;
                break;
            }
            chars.next();
            key_end = body.len();
        }
        let key = body[start..key_end].to_lowercase();

        let mut value = String::new();
        if let Some(&(_, '=')) = chars.peek() {
            chars.next();
            match chars.peek() {
                Some(&(quote_start, quote)) if quote == '"' || quote == '\'' => {
                    chars.next();
                    let value_start = quote_start + quote.len_utf8();
                    let mut value_end = body.len();
                    while let Some(&(i, c)) = chars.peek() {
                        if c == quote {
                            value_end = i;
                            chars.next();
                            break;
                        }
                        chars.next();
                        value_end = body.len();
                    }
                    value = body[value_start..value_end].to_string();
                },
                Some(&(value_start, _)) => {
                    let mut value_end = body.len();
                    while let Some(&(i, c)) = chars.peek() {
                        if c.is_whitespace() {
                            value_end = i;
                            break;
                        }
                        chars.next();
                        value_end = body.len();
                    }
                    value = body[value_start..value_end].to_string();
                },
                None => {},
            }
        }
        if !key.is_empty() {
            attrs.push((key, value));
        }
    }
    (name, attrs, self_closing)
}
