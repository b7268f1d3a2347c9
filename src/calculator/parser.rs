//! Recursive-descent parser producing an expression tree.
//!
//! Binding strength, tightest first:
//!
//! 1. postfix factorial `n!`
//! 2. exponentiation `a ^ b` (right-associative)
//! 3. unary negation `-a`
//! 4. multiplication and division (left-associative)
//! 5. addition and subtraction (left-associative)
//!
//! Unclosed parentheses are closed at the end of the input before parsing.
//! Nesting and tree depth are bounded so that neither parsing nor evaluation
//! can exhaust the stack.

use super::error::ParseError;
use super::tokenizer::{Function, Operator, Token};

/// Deepest nesting of parentheses, function calls, signs and exponents.
pub const MAX_NESTING: usize = 256;

/// Deepest expression tree the parser will build.
pub const MAX_TREE_DEPTH: usize = 1024;

/// A node of the expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(f64),
    BinaryOp {
        op: Operator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    UnaryFunction {
        function: Function,
        operand: Box<Expr>,
    },
    Factorial(Box<Expr>),
    Negate(Box<Expr>),
}

/// A parsed subtree and its depth.
type Parsed = (Expr, usize);

fn node(expr: Expr, depth: usize) -> Result<Parsed, ParseError> {
    if depth > MAX_TREE_DEPTH {
        return Err(ParseError::TooDeep);
    }
    Ok((expr, depth))
}

fn binary(op: Operator, (left, ld): Parsed, (right, rd): Parsed) -> Result<Parsed, ParseError> {
    let expr = Expr::BinaryOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
    };
    node(expr, 1 + ld.max(rd))
}

/// Parse a token sequence into an expression tree.
pub fn parse(tokens: &[Token]) -> Result<Expr, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::EmptyOrIncomplete);
    }

    let closed = auto_close(tokens);
    let mut parser = Parser {
        tokens: &closed,
        pos: 0,
        nesting: 0,
    };
    let (expr, _) = parser.parse_sum()?;

    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(ParseError::UnexpectedToken(token.to_string())),
    }
}

/// Append a `)` for every `(` left open.
fn auto_close(tokens: &[Token]) -> Vec<Token> {
    let opened = tokens.iter().filter(|t| **t == Token::LeftParen).count();
    let closed = tokens.iter().filter(|t| **t == Token::RightParen).count();

    let mut out = tokens.to_vec();
    out.extend(std::iter::repeat_n(
        Token::RightParen,
        opened.saturating_sub(closed),
    ));
    out
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    nesting: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn peek_operator(&self) -> Option<Operator> {
        match self.peek() {
            Some(Token::Operator(op)) => Some(*op),
            _ => None,
        }
    }

    /// Run `f` one nesting level deeper.
    fn nested(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<Parsed, ParseError>,
    ) -> Result<Parsed, ParseError> {
        if self.nesting >= MAX_NESTING {
            return Err(ParseError::TooDeep);
        }
        self.nesting += 1;
        let result = f(self);
        self.nesting -= 1;
        result
    }

    fn parse_sum(&mut self) -> Result<Parsed, ParseError> {
        let mut left = self.parse_product()?;
        while let Some(op @ (Operator::Add | Operator::Subtract)) = self.peek_operator() {
            self.pos += 1;
            let right = self.parse_product()?;
            left = binary(op, left, right)?;
        }
        Ok(left)
    }

    fn parse_product(&mut self) -> Result<Parsed, ParseError> {
        let mut left = self.parse_unary()?;
        while let Some(op @ (Operator::Multiply | Operator::Divide)) = self.peek_operator() {
            self.pos += 1;
            let right = self.parse_unary()?;
            left = binary(op, left, right)?;
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Parsed, ParseError> {
        match self.peek_operator() {
            Some(Operator::Subtract) => {
                self.pos += 1;
                let (operand, depth) = self.nested(Self::parse_unary)?;
                node(Expr::Negate(Box::new(operand)), depth + 1)
            }
            Some(Operator::Add) => {
                self.pos += 1;
                self.nested(Self::parse_unary)
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Parsed, ParseError> {
        let base = self.parse_postfix()?;
        if self.peek_operator() == Some(Operator::Power) {
            self.pos += 1;
            // The exponent may itself be negated or another power: 2^-1, 2^3^2.
            let exponent = self.nested(Self::parse_unary)?;
            return binary(Operator::Power, base, exponent);
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> Result<Parsed, ParseError> {
        let (mut expr, mut depth) = self.parse_primary()?;
        while self.peek() == Some(&Token::Factorial) {
            self.pos += 1;
            (expr, depth) = node(Expr::Factorial(Box::new(expr)), depth + 1)?;
        }
        Ok((expr, depth))
    }

    fn parse_primary(&mut self) -> Result<Parsed, ParseError> {
        match self.advance() {
            None | Some(Token::Operator(_)) => Err(ParseError::EmptyOrIncomplete),
            Some(Token::Number(n)) => Ok((Expr::Literal(*n), 1)),
            Some(Token::Constant(c)) => Ok((Expr::Literal(c.value()), 1)),
            Some(Token::LeftParen) => {
                let inner = self.nested(Self::parse_sum)?;
                self.expect_right_paren()?;
                Ok(inner)
            }
            Some(Token::Function(function)) => {
                if self.peek() != Some(&Token::LeftParen) {
                    return Err(ParseError::ExpectedParen(function.name().to_string()));
                }
                self.pos += 1;
                let (operand, depth) = self.nested(Self::parse_sum)?;
                self.expect_right_paren()?;
                let expr = Expr::UnaryFunction {
                    function: *function,
                    operand: Box::new(operand),
                };
                node(expr, depth + 1)
            }
            Some(token @ (Token::RightParen | Token::Factorial)) => {
                Err(ParseError::UnexpectedToken(token.to_string()))
            }
        }
    }

    fn expect_right_paren(&mut self) -> Result<(), ParseError> {
        match self.advance() {
            Some(Token::RightParen) => Ok(()),
            Some(token) => Err(ParseError::UnexpectedToken(token.to_string())),
            None => Err(ParseError::EmptyOrIncomplete),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::tokenizer::tokenize;

    fn parse_str(text: &str) -> Result<Expr, ParseError> {
        parse(&tokenize(text).unwrap())
    }

    fn lit(n: f64) -> Box<Expr> {
        Box::new(Expr::Literal(n))
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        let expr = parse_str("2+3*4").unwrap();
        assert_eq!(
            expr,
            Expr::BinaryOp {
                op: Operator::Add,
                left: lit(2.0),
                right: Box::new(Expr::BinaryOp {
                    op: Operator::Multiply,
                    left: lit(3.0),
                    right: lit(4.0),
                }),
            }
        );
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        let expr = parse_str("8-3-2").unwrap();
        assert_eq!(
            expr,
            Expr::BinaryOp {
                op: Operator::Subtract,
                left: Box::new(Expr::BinaryOp {
                    op: Operator::Subtract,
                    left: lit(8.0),
                    right: lit(3.0),
                }),
                right: lit(2.0),
            }
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        let expr = parse_str("2^3^2").unwrap();
        assert_eq!(
            expr,
            Expr::BinaryOp {
                op: Operator::Power,
                left: lit(2.0),
                right: Box::new(Expr::BinaryOp {
                    op: Operator::Power,
                    left: lit(3.0),
                    right: lit(2.0),
                }),
            }
        );
    }

    #[test]
    fn test_negation_binds_looser_than_power() {
        let expr = parse_str("-2^2").unwrap();
        assert_eq!(
            expr,
            Expr::Negate(Box::new(Expr::BinaryOp {
                op: Operator::Power,
                left: lit(2.0),
                right: lit(2.0),
            }))
        );
    }

    #[test]
    fn test_factorial_binds_tightest() {
        let expr = parse_str("-3!").unwrap();
        assert_eq!(expr, Expr::Negate(Box::new(Expr::Factorial(lit(3.0)))));

        let expr = parse_str("2^3!").unwrap();
        assert_eq!(
            expr,
            Expr::BinaryOp {
                op: Operator::Power,
                left: lit(2.0),
                right: Box::new(Expr::Factorial(lit(3.0))),
            }
        );
    }

    #[test]
    fn test_auto_close() {
        assert_eq!(parse_str("sin(30"), parse_str("sin(30)"));
        assert_eq!(parse_str("((1+2"), parse_str("((1+2))"));
    }

    #[test]
    fn test_function_requires_paren() {
        assert_eq!(
            parse_str("sqrt 4"),
            Err(ParseError::ExpectedParen("sqrt".into()))
        );
        assert_eq!(
            parse_str("2+cos"),
            Err(ParseError::ExpectedParen("cos".into()))
        );
    }

    #[test]
    fn test_empty_or_incomplete() {
        assert_eq!(parse(&[]), Err(ParseError::EmptyOrIncomplete));
        assert_eq!(parse_str("+"), Err(ParseError::EmptyOrIncomplete));
        assert_eq!(parse_str("*"), Err(ParseError::EmptyOrIncomplete));
        assert_eq!(parse_str("2+"), Err(ParseError::EmptyOrIncomplete));
    }

    #[test]
    fn test_unexpected_tokens() {
        assert_eq!(
            parse_str("2 3"),
            Err(ParseError::UnexpectedToken("number 3".into()))
        );
        assert_eq!(
            parse_str("(2))"),
            Err(ParseError::UnexpectedToken("')'".into()))
        );
        assert_eq!(
            parse_str("()"),
            Err(ParseError::UnexpectedToken("')'".into()))
        );
    }

    #[test]
    fn test_division_by_zero_parses() {
        assert!(parse_str("1/0").is_ok());
    }

    #[test]
    fn test_deep_parens_rejected() {
        let text = format!("{}1", "(".repeat(10_000));
        assert_eq!(parse_str(&text), Err(ParseError::TooDeep));
    }

    #[test]
    fn test_long_sign_chain_rejected() {
        let text = format!("{}1", "-".repeat(50_000));
        assert_eq!(parse_str(&text), Err(ParseError::TooDeep));
    }

    #[test]
    fn test_long_flat_chains_rejected() {
        let sum = format!("{}1", "1+".repeat(5_000));
        assert_eq!(parse_str(&sum), Err(ParseError::TooDeep));

        let factorials = format!("3{}", "!".repeat(5_000));
        assert_eq!(parse_str(&factorials), Err(ParseError::TooDeep));
    }

    #[test]
    fn test_moderate_nesting_accepted() {
        let text = format!("{}1", "(".repeat(200));
        assert_eq!(parse_str(&text), Ok(Expr::Literal(1.0)));

        let sum = format!("{}1", "1+".repeat(500));
        assert!(parse_str(&sum).is_ok());
    }
}
