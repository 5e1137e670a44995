//! Recursive-descent parser for WKT2 bracket trees.
//!
//! Grammar (ISO 19162, simplified to what the registry needs):
//!
//! ```text
//! node   := KEYWORD ws ( '[' | '(' ) value ( ',' value )* ( ']' | ')' )
//! value  := node | quoted | number | KEYWORD
//! quoted := '"' ( [^"] | '""' )* '"'
//! ```

use crate::{Error, Result};

// ─── Tree ────────────────────────────────────────────────────────────────────

/// A single argument inside a node's brackets.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  /// A quoted string, with `""` escapes already collapsed.
  Text(String),
  /// A numeric literal, kept verbatim.
  Number(String),
  /// A bare enumeration token such as `north` or `ellipsoidal`.
  Enum(String),
  Node(Node),
}

/// `KEYWORD[arg, ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
  pub keyword: String,
  pub args:    Vec<Value>,
}

impl Node {
  pub fn is(&self, keyword: &str) -> bool { self.keyword.eq_ignore_ascii_case(keyword) }

  /// The first quoted argument, conventionally the object's name.
  pub fn name(&self) -> Option<&str> {
    self.args.iter().find_map(|v| match v {
      Value::Text(s) => Some(s.as_str()),
      _ => None,
    })
  }

  /// Direct child nodes, in order.
  pub fn children(&self) -> impl Iterator<Item = &Node> {
    self.args.iter().filter_map(|v| match v {
      Value::Node(n) => Some(n),
      _ => None,
    })
  }

  /// First descendant (depth-first, pre-order, excluding `self`) whose
  /// keyword is one of `keywords`.
  pub fn find_any(&self, keywords: &[&str]) -> Option<&Node> {
    for child in self.children() {
      if keywords.iter().any(|k| child.is(k)) {
        return Some(child);
      }
      if let Some(found) = child.find_any(keywords) {
        return Some(found);
      }
    }
    None
  }
}

impl Value {
  /// Integer value of a number, or of a quoted string holding only digits.
  pub fn as_integer(&self) -> Option<i64> {
    let s = match self {
      Value::Number(s) | Value::Text(s) => s.trim(),
      _ => return None,
    };
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
      s.parse().ok()
    } else {
      None
    }
  }
}

// ─── Parser ──────────────────────────────────────────────────────────────────

/// Deepest bracket nesting accepted. Real definitions stay well under ten.
const MAX_DEPTH: usize = 64;

/// Parse a single WKT definition. Only whitespace may follow the root node.
pub fn parse(input: &str) -> Result<Node> {
  let mut p = Parser::new(input);
  p.skip_ws();
  let root = p.node()?;
  p.skip_ws();
  if let Some(c) = p.peek() {
    return Err(p.error(format!("unexpected {c:?} after end of definition")));
  }
  Ok(root)
}

struct Parser {
  chars: Vec<char>,
  pos:   usize,
  line:  usize,
  depth: usize,
}

impl Parser {
  fn new(input: &str) -> Self {
    Self {
      chars: input.chars().collect(),
      pos:   0,
      line:  1,
      depth: 0,
    }
  }

  fn peek(&self) -> Option<char> { self.chars.get(self.pos).copied() }

  fn bump(&mut self) -> Option<char> {
    let c = self.peek()?;
    self.pos += 1;
    if c == '\n' {
      self.line += 1;
    }
    Some(c)
  }

  fn error(&self, message: impl Into<String>) -> Error {
    Error::Syntax {
      line:    self.line,
      message: message.into(),
    }
  }

  fn skip_ws(&mut self) {
    while self.peek().is_some_and(char::is_whitespace) {
      self.bump();
    }
  }

  fn keyword(&mut self) -> Result<String> {
    let start = self.pos;
    while self
      .peek()
      .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
    {
      self.bump();
    }
    if start == self.pos {
      return Err(match self.peek() {
        Some(c) => self.error(format!("expected keyword, found {c:?}")),
        None => self.error("expected keyword, found end of input"),
      });
    }
    Ok(self.chars[start..self.pos].iter().collect())
  }

  fn node(&mut self) -> Result<Node> {
    let keyword = self.keyword()?;
    self.skip_ws();
    self.node_body(keyword)
  }

  fn node_body(&mut self, keyword: String) -> Result<Node> {
    if self.depth == MAX_DEPTH {
      return Err(self.error(format!("{keyword} nested deeper than {MAX_DEPTH} levels")));
    }
    self.depth += 1;
    let node = self.node_args(keyword);
    self.depth -= 1;
    node
  }

  fn node_args(&mut self, keyword: String) -> Result<Node> {
    let close = match self.bump() {
      Some('[') => ']',
      Some('(') => ')',
      Some(c) => return Err(self.error(format!("expected '[' after {keyword}, found {c:?}"))),
      None => return Err(self.error(format!("expected '[' after {keyword}"))),
    };

    let mut args = Vec::new();
    loop {
      self.skip_ws();
      args.push(self.value()?);
      self.skip_ws();
      match self.bump() {
        Some(',') => continue,
        Some(c) if c == close => break,
        Some(c) => {
          return Err(self.error(format!("expected ',' or {close:?} in {keyword}, found {c:?}")));
        }
        None => return Err(self.error(format!("unterminated {keyword}"))),
      }
    }

    Ok(Node { keyword, args })
  }

  fn value(&mut self) -> Result<Value> {
    match self.peek() {
      Some('"') => self.quoted().map(Value::Text),
      Some(c) if c.is_ascii_digit() || matches!(c, '+' | '-' | '.') => {
        Ok(Value::Number(self.number()))
      }
      Some(c) if c.is_ascii_alphabetic() => {
        let word = self.keyword()?;
        self.skip_ws();
        if matches!(self.peek(), Some('[' | '(')) {
          self.node_body(word).map(Value::Node)
        } else {
          Ok(Value::Enum(word))
        }
      }
      Some(c) => Err(self.error(format!("unexpected {c:?}"))),
      None => Err(self.error("unexpected end of input")),
    }
  }

  fn quoted(&mut self) -> Result<String> {
    let start_line = self.line;
    self.bump();
    let mut out = String::new();
    loop {
      match self.bump() {
        Some('"') if self.peek() == Some('"') => {
          self.bump();
          out.push('"');
        }
        Some('"') => return Ok(out),
        Some(c) => out.push(c),
        None => {
          return Err(Error::Syntax {
            line:    start_line,
            message: "unterminated string".into(),
          });
        }
      }
    }
  }

  fn number(&mut self) -> String {
    let start = self.pos;
    if matches!(self.peek(), Some('+' | '-')) {
      self.bump();
    }
    while let Some(c) = self.peek() {
      let exp_sign = matches!(c, '+' | '-')
        && matches!(self.chars.get(self.pos - 1), Some('e' | 'E'));
      if c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E') || exp_sign {
        self.bump();
      } else {
        break;
      }
    }
    self.chars[start..self.pos].iter().collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const MARS: &str = r#"GEOGCRS["Mars (2015) - Sphere / Ocentric",
    DATUM["Mars (2015) - Sphere",
        ELLIPSOID["Mars (2015) - Sphere",3396190,0,
            LENGTHUNIT["metre",1,
                ID["EPSG",9001]]],
        ANCHOR["Viking 1 lander : 47.95137 W"]],
        PRIMEM["Reference Meridian",0,
            ANGLEUNIT["degree",0.0174532925199433,
                ID["EPSG",9122]]],
    CS[ellipsoidal,2],
        AXIS["geodetic latitude (Lat)",north,
            ORDER[1],
            ANGLEUNIT["degree",0.0174532925199433]],
        AXIS["geodetic longitude (Lon)",east,
            ORDER[2],
            ANGLEUNIT["degree",0.0174532925199433]],
    ID["IAU",49900,2015],
    REMARK["Use semi-major radius as sphere"]]"#;

  #[test]
  fn parses_nested_geographic_crs() {
    let root = parse(MARS).unwrap();
    assert!(root.is("geogcrs"));
    assert_eq!(root.name(), Some("Mars (2015) - Sphere / Ocentric"));

    let datum = root.find_any(&["DATUM"]).unwrap();
    assert_eq!(datum.name(), Some("Mars (2015) - Sphere"));

    let ellipsoid = root.find_any(&["ELLIPSOID"]).unwrap();
    assert_eq!(ellipsoid.args[1], Value::Number("3396190".into()));
  }

  #[test]
  fn direct_children_exclude_nested_ids() {
    let root = parse(MARS).unwrap();
    let ids: Vec<&Node> = root.children().filter(|n| n.is("ID")).collect();
    assert_eq!(ids.len(), 1);
    assert_eq!(ids[0].args[1].as_integer(), Some(49900));
    assert_eq!(ids[0].args[2].as_integer(), Some(2015));
  }

  #[test]
  fn bare_enums_and_parentheses() {
    let root = parse("CS(ellipsoidal, 2)").unwrap();
    assert_eq!(root.args[0], Value::Enum("ellipsoidal".into()));
    assert_eq!(root.args[1], Value::Number("2".into()));
  }

  #[test]
  fn doubled_quotes_are_unescaped() {
    let root = parse(r#"REMARK["the ""prime"" meridian"]"#).unwrap();
    assert_eq!(root.name(), Some(r#"the "prime" meridian"#));
  }

  #[test]
  fn exponent_numbers() {
    let root = parse("X[1.5E-3,-2e+10]").unwrap();
    assert_eq!(root.args[0], Value::Number("1.5E-3".into()));
    assert_eq!(root.args[1], Value::Number("-2e+10".into()));
  }

  #[test]
  fn unterminated_node_reports_line() {
    let err = parse("GEOGCRS[\"x\",\n  DATUM[\"y\"").unwrap_err();
    match err {
      Error::Syntax { line, .. } => assert_eq!(line, 2),
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[test]
  fn nesting_is_bounded() {
    let nested = |levels: usize| format!("{}1{}", "A[".repeat(levels), "]".repeat(levels));

    assert!(parse(&nested(MAX_DEPTH)).is_ok());
    let err = parse(&nested(100_000)).unwrap_err();
    assert!(err.to_string().contains("nested deeper"), "{err}");
  }

  #[test]
  fn trailing_garbage_rejected() {
    assert!(matches!(
      parse("ID[\"IAU\",1,2015] extra"),
      Err(Error::Syntax { .. })
    ));
  }
}
