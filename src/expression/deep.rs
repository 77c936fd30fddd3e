use crate::data_type::Real;
use crate::definitions::MAX_TREE_DEPTH;
use crate::expression::Express;
use crate::operators::{Sign, SignKind};
use crate::parser::{OpToken, Token};
use crate::{exerr, ExErrorKind, ExResult};
use log::trace;
use std::fmt::{self, Display, Formatter};

/// A node of the expression tree. Every node owns its children exclusively.
#[derive(Clone, PartialEq, Debug)]
pub enum DeepNode<T> {
    Num(T),
    /// Prefix or postfix operator applied to one child.
    Unary { sign: Sign, child: Box<DeepNode<T>> },
    Binary {
        sign: Sign,
        lhs: Box<DeepNode<T>>,
        rhs: Box<DeepNode<T>>,
    },
}

impl<T: Real> DeepNode<T> {
    /// Post-order evaluation, left before right.
    pub fn eval(&self) -> ExResult<T> {
        match self {
            DeepNode::Num(x) => Ok(*x),
            DeepNode::Unary { sign, child } => Ok((sign.unary()?)(child.eval()?)),
            DeepNode::Binary { sign, lhs, rhs } => {
                let l = lhs.eval()?;
                let r = rhs.eval()?;
                Ok((sign.bin()?)(l, r))
            }
        }
    }

    /// Number of operator nodes.
    pub fn n_ops(&self) -> usize {
        match self {
            DeepNode::Num(_) => 0,
            DeepNode::Unary { child, .. } => 1 + child.n_ops(),
            DeepNode::Binary { lhs, rhs, .. } => 1 + lhs.n_ops() + rhs.n_ops(),
        }
    }
}

fn check_height(height: usize) -> ExResult<usize> {
    if height > MAX_TREE_DEPTH {
        exerr!(
            ExErrorKind::TooDeeplyNested,
            "expression tree is higher than {}",
            MAX_TREE_DEPTH
        )
    } else {
        Ok(height)
    }
}

/// Builds a tree by precedence climbing. Consumes tokens starting at `*pos` as long as
/// their left binding power exceeds `min_bp`. Equal binding powers stop the loop,
/// hence operators with equal powers on both sides associate to the left. Returns the
/// node together with its height. `level` is the recursion depth.
fn parse_bp<T: Real>(
    tokens: &[Token<T>],
    pos: &mut usize,
    min_bp: u8,
    level: usize,
) -> ExResult<(DeepNode<T>, usize)> {
    check_height(level)?;
    let (mut lhs, mut height) = match tokens.get(*pos) {
        None => {
            return exerr!(
                ExErrorKind::IncompleteExpression,
                "expected a value after token {}",
                pos
            )
        }
        Some(Token::Num(x)) => {
            *pos += 1;
            (DeepNode::Num(*x), 0)
        }
        Some(Token::Op(op)) if op.kind() == SignKind::RightUnary => {
            *pos += 1;
            let (child, child_height) = parse_bp(tokens, pos, op.rbp, level + 1)?;
            let node = DeepNode::Unary {
                sign: op.sign,
                child: Box::new(child),
            };
            (node, check_height(child_height + 1)?)
        }
        Some(Token::Op(op)) => {
            return exerr!(
                ExErrorKind::UnexpectedOperator,
                "operator {} at token {} where a value is expected",
                op.sign.repr(),
                pos
            )
        }
    };

    loop {
        let op: OpToken = match tokens.get(*pos) {
            None => break,
            Some(Token::Num(_)) => {
                return exerr!(
                    ExErrorKind::UnexpectedValue,
                    "value at token {} where an operator is expected",
                    pos
                )
            }
            Some(Token::Op(op)) => *op,
        };
        match op.kind() {
            SignKind::RightUnary => {
                return exerr!(
                    ExErrorKind::UnexpectedValue,
                    "prefix operator {} at token {} where an operator is expected",
                    op.sign.repr(),
                    pos
                )
            }
            SignKind::LeftUnary | SignKind::Infix if op.lbp <= min_bp => break,
            SignKind::LeftUnary => {
                *pos += 1;
                height = check_height(height + 1)?;
                lhs = DeepNode::Unary {
                    sign: op.sign,
                    child: Box::new(lhs),
                };
            }
            SignKind::Infix => {
                *pos += 1;
                let (rhs, rhs_height) = parse_bp(tokens, pos, op.rbp, level + 1)?;
                height = check_height(height.max(rhs_height) + 1)?;
                lhs = DeepNode::Binary {
                    sign: op.sign,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                };
            }
            SignKind::None | SignKind::Const => {
                return exerr!(
                    ExErrorKind::UnknownOperator,
                    "{} at token {} is not an operator",
                    op.sign.repr(),
                    pos
                )
            }
        }
    }
    Ok((lhs, height))
}

/// Binary expression tree created by precedence climbing, e.g.,
/// ```rust
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// #
/// use zipex::prelude::*;
/// let deepex = DeepEx::<f32>::parse("2^3^2")?;
/// assert!((deepex.eval()? - 512.0).abs() < 1e-6);
/// #
/// #     Ok(())
/// # }
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct DeepEx<T> {
    root: DeepNode<T>,
    text: String,
}

impl<T: Real> DeepEx<T> {
    pub fn root(&self) -> &DeepNode<T> {
        &self.root
    }
}

impl<T: Real> Express<T> for DeepEx<T> {
    fn from_tokens(text: &str, tokens: &[Token<T>]) -> ExResult<Self> {
        let mut pos = 0;
        let (root, height) = parse_bp(tokens, &mut pos, 0, 0)?;
        if pos < tokens.len() {
            return exerr!(
                ExErrorKind::UnexpectedValue,
                "unexpected token at {} in {}",
                pos,
                text
            );
        }
        trace!(
            "tree of {} has {} operators and height {}",
            text,
            root.n_ops(),
            height
        );
        Ok(DeepEx {
            root,
            text: text.to_string(),
        })
    }

    fn eval(&self) -> ExResult<T> {
        self.root.eval()
    }

    fn unparse(&self) -> &str {
        self.text.as_str()
    }
}

/// The expression is displayed as the string it has been parsed from.
impl<T: Real> Display for DeepEx<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.unparse())
    }
}
