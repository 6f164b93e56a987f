//! Typesetting of overlay labels.
//!
//! The controller only sees [`TypesettingEngine`]: it loads the engine once
//! when the screen mounts and asks it to retypeset after new labels appear.
//! [`TexTypesetter`] is the built-in engine; it understands the inline-math
//! delimiters and flattens a practical subset of TeX into Unicode text that
//! egui can draw.

use crate::error::{CanvasError, Result};
use crate::overlay::labels::OverlayLabel;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMath {
    pub body: String,
    /// Size relative to normal text, from the last TeX size command.
    pub scale: f32,
}

pub trait TypesettingEngine: Send {
    fn load(&mut self) -> Result<()>;

    /// Typeset every label added since the previous call.
    fn retypeset(&mut self, labels: &mut [OverlayLabel]);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
}

impl Delimiters {
    pub fn new(open: &str, close: &str) -> Self {
        Self {
            open: open.to_owned(),
            close: close.to_owned(),
        }
    }
}

pub fn default_inline_delimiters() -> Vec<Delimiters> {
    vec![Delimiters::new("$", "$"), Delimiters::new(r"\(", r"\)")]
}

#[derive(Debug, Clone)]
pub struct TexTypesetter {
    inline: Vec<Delimiters>,
    loaded: bool,
}

impl Default for TexTypesetter {
    fn default() -> Self {
        Self::with_delimiters(default_inline_delimiters())
    }
}

impl TexTypesetter {
    pub fn with_delimiters(inline: Vec<Delimiters>) -> Self {
        Self {
            inline,
            loaded: false,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Render the first inline-math span in `text`, or `None` if there is none.
    pub fn typeset(&self, text: &str) -> Option<RenderedMath> {
        let (start, delims) = self
            .inline
            .iter()
            .filter_map(|d| text.find(d.open.as_str()).map(|idx| (idx, d)))
            .min_by_key(|(idx, d)| (*idx, std::cmp::Reverse(d.open.len())))?;
        let inner_start = start + delims.open.len();
        let inner_len = text[inner_start..].find(delims.close.as_str())?;
        Some(render_tex(&text[inner_start..inner_start + inner_len]))
    }
}

impl TypesettingEngine for TexTypesetter {
    fn load(&mut self) -> Result<()> {
        if self.inline.is_empty() {
            return Err(CanvasError::ScriptLoad(
                "no inline math delimiters configured".into(),
            ));
        }
        if let Some(bad) = self
            .inline
            .iter()
            .find(|d| d.open.is_empty() || d.close.is_empty())
        {
            return Err(CanvasError::ScriptLoad(format!(
                "empty inline math delimiter {:?}..{:?}",
                bad.open, bad.close
            )));
        }
        self.loaded = true;
        tracing::debug!(delimiters = self.inline.len(), "typesetter loaded");
        Ok(())
    }

    fn retypeset(&mut self, labels: &mut [OverlayLabel]) {
        if !self.loaded {
            return;
        }
        for label in labels.iter_mut().filter(|l| l.needs_typeset()) {
            let rendered = self.typeset(label.text());
            label.set_rendered(rendered);
        }
    }
}

/// Flatten TeX math into a single line of Unicode text.
pub fn render_tex(source: &str) -> RenderedMath {
    let mut parser = TexParser {
        chars: source.chars().collect(),
        pos: 0,
        scale: 1.0,
    };
    let body = parser.sequence(false);
    RenderedMath {
        body: body.trim().to_owned(),
        scale: parser.scale,
    }
}

struct TexParser {
    chars: Vec<char>,
    pos: usize,
    scale: f32,
}

impl TexParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn sequence(&mut self, in_group: bool) -> String {
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            match ch {
                '}' if in_group => {
                    self.pos += 1;
                    return out;
                }
                '}' => {
                    self.pos += 1;
                }
                '{' => {
                    self.pos += 1;
                    out.push_str(&self.sequence(true));
                }
                '\\' => {
                    self.pos += 1;
                    out.push_str(&self.command());
                }
                '^' => {
                    self.pos += 1;
                    let arg = self.argument();
                    out.push_str(&scripted(&arg, superscript, '^'));
                }
                '_' => {
                    self.pos += 1;
                    let arg = self.argument();
                    out.push_str(&scripted(&arg, subscript, '_'));
                }
                '~' => {
                    self.pos += 1;
                    out.push(' ');
                }
                '*' => {
                    self.pos += 1;
                    out.push('×');
                }
                _ => {
                    self.pos += 1;
                    out.push(ch);
                }
            }
        }
        out
    }

    /// A braced group, a control sequence or a single character.
    fn argument(&mut self) -> String {
        while self.peek() == Some(' ') {
            self.pos += 1;
        }
        match self.bump() {
            Some('{') => self.sequence(true),
            Some('\\') => self.command(),
            Some(ch) => ch.to_string(),
            None => String::new(),
        }
    }

    fn command(&mut self) -> String {
        let mut name = String::new();
        while let Some(ch) = self.peek().filter(char::is_ascii_alphabetic) {
            name.push(ch);
            self.pos += 1;
        }
        if name.is_empty() {
            return match self.bump() {
                Some(',' | ';' | ':' | ' ') => " ".into(),
                Some('!') => String::new(),
                Some('\\') => " ".into(),
                Some(ch) => ch.to_string(),
                None => String::new(),
            };
        }

        if let Some(scale) = size_scale(&name) {
            self.scale = scale;
            return String::new();
        }
        match name.as_str() {
            "frac" | "dfrac" | "tfrac" => {
                let num = self.argument();
                let den = self.argument();
                format!("{}/{}", grouped(&num), grouped(&den))
            }
            "sqrt" => {
                let arg = self.argument();
                format!("√{}", grouped(&arg))
            }
            "text" | "mathrm" | "mathit" | "mathbf" | "operatorname" | "textrm" => {
                self.argument()
            }
            "left" | "right" | "displaystyle" | "limits" => String::new(),
            "quad" | "qquad" => "  ".into(),
            other => symbol(other)
                .map(str::to_owned)
                .unwrap_or_else(|| other.to_owned()),
        }
    }
}

fn grouped(text: &str) -> String {
    if text.chars().count() <= 1 || text.chars().all(|c| c.is_ascii_alphanumeric() || c == '.') {
        text.to_owned()
    } else {
        format!("({text})")
    }
}

fn scripted(arg: &str, map: fn(char) -> Option<char>, marker: char) -> String {
    let mapped: Option<String> = arg.chars().map(map).collect();
    match mapped {
        Some(s) if !s.is_empty() => s,
        _ if arg.chars().count() == 1 => format!("{marker}{arg}"),
        _ => format!("{marker}({arg})"),
    }
}

fn size_scale(name: &str) -> Option<f32> {
    Some(match name {
        "tiny" => 0.5,
        "scriptsize" => 0.7,
        "footnotesize" => 0.8,
        "small" => 0.9,
        "normalsize" => 1.0,
        "large" => 1.2,
        "Large" => 1.44,
        "LARGE" => 1.728,
        "huge" => 2.074,
        "Huge" => 2.488,
        _ => return None,
    })
}

fn symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "times" => "×",
        "cdot" => "·",
        "div" => "÷",
        "pm" => "±",
        "mp" => "∓",
        "leq" | "le" => "≤",
        "geq" | "ge" => "≥",
        "neq" | "ne" => "≠",
        "approx" => "≈",
        "equiv" => "≡",
        "infty" => "∞",
        "to" | "rightarrow" => "→",
        "Rightarrow" | "implies" => "⇒",
        "sum" => "∑",
        "prod" => "∏",
        "int" => "∫",
        "partial" => "∂",
        "circ" | "degree" => "°",
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" | "varepsilon" => "ε",
        "theta" => "θ",
        "lambda" => "λ",
        "mu" => "μ",
        "pi" => "π",
        "rho" => "ρ",
        "sigma" => "σ",
        "tau" => "τ",
        "phi" | "varphi" => "φ",
        "omega" => "ω",
        "Delta" => "Δ",
        "Sigma" => "Σ",
        "Omega" => "Ω",
        "Pi" => "Π",
        _ => return None,
    })
}

fn superscript(ch: char) -> Option<char> {
    Some(match ch {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'n' => 'ⁿ',
        'i' => 'ⁱ',
        _ => return None,
    })
}

fn subscript(ch: char) -> Option<char> {
    Some(match ch {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        _ => return None,
    })
}
