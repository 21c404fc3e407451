//! Hand-written parser for the compact type notation used in declaration files.
//!
//! Handles `[const] name[<args>] [const] [*|&|&&]` including multi-word
//! primitive names (`unsigned int`, `long long`) and `::`-qualified names.
//! Does NOT handle function pointers, arrays or multi-level pointers; those
//! are reported as invalid notation.

use crate::error::{ModelError, Result};
use crate::types::Passing;

/// An unresolved type name with its template arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpr {
    /// Name as written, with a leading `std::` removed.
    pub name: String,
    /// Template arguments, if any.
    pub args: Vec<TypeExpr>,
}

impl TypeExpr {
    /// Last `::` segment of the name.
    pub fn short_name(&self) -> &str {
        self.name.rsplit("::").next().unwrap_or(&self.name)
    }
}

impl std::fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{arg}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// A parsed notation: base type plus passing mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedType {
    pub base: TypeExpr,
    pub passing: Passing,
}

const PRIMITIVE_WORDS: &[&str] = &["unsigned", "signed", "short", "long", "int", "char", "double"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Word(&'a str),
    Less,
    Greater,
    Comma,
    Star,
    Amp,
    AmpAmp,
}

fn tokenize(input: &str) -> Result<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        let c = bytes[pos] as char;
        match c {
            ' ' | '\t' => pos += 1,
            '<' => {
                tokens.push(Token::Less);
                pos += 1;
            }
            '>' => {
                tokens.push(Token::Greater);
                pos += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                pos += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                pos += 1;
            }
            '&' => {
                if bytes.get(pos + 1) == Some(&b'&') {
                    tokens.push(Token::AmpAmp);
                    pos += 2;
                } else {
                    tokens.push(Token::Amp);
                    pos += 1;
                }
            }
            c if c.is_ascii_alphanumeric() || c == '_' || c == ':' => {
                let start = pos;
                while pos < bytes.len() {
                    let c = bytes[pos] as char;
                    if c.is_ascii_alphanumeric() || c == '_' || c == ':' {
                        pos += 1;
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Word(&input[start..pos]));
            }
            other => {
                return Err(invalid(input, format!("unexpected character '{other}'")));
            }
        }
    }
    Ok(tokens)
}

fn invalid(input: &str, detail: impl Into<String>) -> ModelError {
    ModelError::InvalidNotation {
        input: input.to_string(),
        detail: detail.into(),
    }
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.peek() == Some(&Token::Word(word)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn type_expr(&mut self) -> Result<TypeExpr> {
        // Leading const inside template arguments is meaningless for the
        // boundary; accept and drop it.
        self.eat_word("const");

        let first = match self.peek() {
            Some(Token::Word(w)) => *w,
            _ => return Err(invalid(self.input, "expected type name")),
        };
        self.pos += 1;

        let mut name = first.to_string();
        if PRIMITIVE_WORDS.contains(&first) {
            while let Some(Token::Word(w)) = self.peek() {
                if !PRIMITIVE_WORDS.contains(w) {
                    break;
                }
                name.push(' ');
                name.push_str(w);
                self.pos += 1;
            }
        }

        if name.contains(":::") || name.ends_with("::") {
            return Err(invalid(self.input, format!("malformed qualified name '{name}'")));
        }
        let name = name
            .trim_start_matches("::")
            .trim_start_matches("std::")
            .to_string();

        let mut args = Vec::new();
        if self.peek() == Some(&Token::Less) {
            self.pos += 1;
            loop {
                args.push(self.type_expr()?);
                match self.peek() {
                    Some(Token::Comma) => self.pos += 1,
                    Some(Token::Greater) => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(invalid(self.input, "unterminated template argument list")),
                }
            }
        }

        Ok(TypeExpr { name, args })
    }

    fn qualified(&mut self) -> Result<ParsedType> {
        let leading_const = matches!(self.peek(), Some(Token::Word("const")));
        let base = self.type_expr()?;
        let trailing_const = self.eat_word("const");
        let is_const = leading_const || trailing_const;

        let passing = match self.peek() {
            None => Passing::Value,
            Some(Token::Star) => {
                self.pos += 1;
                // `T* const` is still a single-level pointer
                self.eat_word("const");
                if self.peek() == Some(&Token::Star) {
                    return Err(invalid(self.input, "multi-level pointers are not supported"));
                }
                if is_const {
                    Passing::ConstPointer
                } else {
                    Passing::Pointer
                }
            }
            Some(Token::Amp) => {
                self.pos += 1;
                if is_const {
                    Passing::ConstRef
                } else {
                    Passing::Ref
                }
            }
            Some(Token::AmpAmp) => {
                self.pos += 1;
                Passing::RvalueRef
            }
            Some(other) => {
                return Err(invalid(self.input, format!("unexpected token {other:?}")));
            }
        };

        if self.pos != self.tokens.len() {
            return Err(invalid(self.input, "trailing tokens after type"));
        }

        Ok(ParsedType { base, passing })
    }
}

/// Parse a type notation string.
///
/// Examples:
/// - `"int32"`
/// - `"const StringVector&"`
/// - `"vector<string>"`
/// - `"Box<int32>*"`
pub fn parse_type(input: &str) -> Result<ParsedType> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid(input, "empty type"));
    }
    let tokens = tokenize(trimmed)?;
    let mut parser = Parser {
        input: trimmed,
        tokens,
        pos: 0,
    };
    parser.qualified()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_name() {
        let p = parse_type("int32").unwrap();
        assert_eq!(p.base.name, "int32");
        assert!(p.base.args.is_empty());
        assert_eq!(p.passing, Passing::Value);
    }

    #[test]
    fn parse_const_reference() {
        let p = parse_type("const StringVector&").unwrap();
        assert_eq!(p.base.name, "StringVector");
        assert_eq!(p.passing, Passing::ConstRef);
    }

    #[test]
    fn parse_east_const_reference() {
        let p = parse_type("StringVector const &").unwrap();
        assert_eq!(p.passing, Passing::ConstRef);
    }

    #[test]
    fn parse_rvalue_reference() {
        let p = parse_type("StringVector&&").unwrap();
        assert_eq!(p.passing, Passing::RvalueRef);
    }

    #[test]
    fn parse_pointers() {
        assert_eq!(parse_type("Widget*").unwrap().passing, Passing::Pointer);
        assert_eq!(parse_type("const char*").unwrap().passing, Passing::ConstPointer);
        assert_eq!(parse_type("Widget* const").unwrap().passing, Passing::Pointer);
    }

    #[test]
    fn parse_multi_word_primitive() {
        let p = parse_type("unsigned long long").unwrap();
        assert_eq!(p.base.name, "unsigned long long");
        let p = parse_type("const unsigned int&").unwrap();
        assert_eq!(p.base.name, "unsigned int");
        assert_eq!(p.passing, Passing::ConstRef);
    }

    #[test]
    fn parse_template_arguments() {
        let p = parse_type("std::map<std::string, vector<int32>>").unwrap();
        assert_eq!(p.base.name, "map");
        assert_eq!(p.base.args.len(), 2);
        assert_eq!(p.base.args[0].name, "string");
        assert_eq!(p.base.args[1].name, "vector");
        assert_eq!(p.base.args[1].args[0].name, "int32");
    }

    #[test]
    fn qualified_names_keep_namespace() {
        let p = parse_type("testapi::UserGroup*").unwrap();
        assert_eq!(p.base.name, "testapi::UserGroup");
        assert_eq!(p.base.short_name(), "UserGroup");
    }

    #[test]
    fn reject_multi_level_pointer() {
        assert!(parse_type("char**").is_err());
    }

    #[test]
    fn reject_unterminated_arguments() {
        assert!(parse_type("vector<string").is_err());
    }

    #[test]
    fn reject_empty_and_garbage() {
        assert!(parse_type("").is_err());
        assert!(parse_type("int (*)(int)").is_err());
        assert!(parse_type("int x y").is_err());
    }
}
