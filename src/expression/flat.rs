use crate::data_type::Real;
use crate::definitions::N_LINKS_ON_STACK;
use crate::expression::Express;
use crate::operators::{Sign, SignKind};
use crate::parser::{OpToken, Token};
use crate::{exerr, ExError, ExErrorKind, ExResult};
use log::trace;
use smallvec::SmallVec;
use std::fmt::{self, Display, Formatter};

/// Exactly which fields of a [`Link`](Link) are populated and what the builder may do
/// with it next. Pending states wait for the number on their left.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ChainState {
    /// Bare number without operator and continuation.
    Num,
    /// Postfix operator at the very end, operand missing.
    PostfixPending,
    /// Postfix operator at the very end with its operand.
    PostfixTail,
    /// Postfix operator with continuation, operand missing.
    PostfixPendingLinked,
    /// Postfix operator with continuation and its operand.
    PostfixLinked,
    /// Prefix operator, its operand is the value of the continuation.
    Prefix,
    /// Infix operator, left operand missing.
    InfixPending,
    /// Infix operator with its left operand, the right one is the value of the
    /// continuation.
    InfixLinked,
}

impl ChainState {
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            ChainState::PostfixPending
                | ChainState::PostfixPendingLinked
                | ChainState::InfixPending
        )
    }

    pub fn has_next(&self) -> bool {
        !matches!(
            self,
            ChainState::Num | ChainState::PostfixPending | ChainState::PostfixTail
        )
    }

    /// State after the left value has been filled in.
    pub fn filled(&self) -> ChainState {
        match self {
            ChainState::PostfixPending => ChainState::PostfixTail,
            ChainState::PostfixPendingLinked => ChainState::PostfixLinked,
            ChainState::InfixPending => ChainState::InfixLinked,
            _ => *self,
        }
    }
}

/// A link of the chain. The continuation of the link at index `i` is the link at
/// `i + 1`, i.e., the links are stored in the order of the input.
#[derive(Clone, PartialEq, Debug)]
pub struct Link<T> {
    pub state: ChainState,
    pub sign: Option<Sign>,
    pub lbp: u8,
    pub rbp: u8,
    pub lhs: Option<T>,
}

impl<T: Real> Link<T> {
    fn from_num(x: T) -> Self {
        Link {
            state: ChainState::Num,
            sign: None,
            lbp: 0,
            rbp: 0,
            lhs: Some(x),
        }
    }

    fn from_op(state: ChainState, op: &OpToken) -> Self {
        Link {
            state,
            sign: Some(op.sign),
            lbp: op.lbp,
            rbp: op.rbp,
            lhs: None,
        }
    }

    fn fill(&mut self, x: T) {
        self.lhs = Some(x);
        self.state = self.state.filled();
    }

    fn op_sign(&self) -> ExResult<Sign> {
        self.sign.ok_or_else(|| {
            ExError::new(
                ExErrorKind::IrreducibleChain,
                "link without operator cannot be stepped",
            )
        })
    }

    /// Tries to compute the value of this link together with its continuation. `None`
    /// means an operation further down the chain has to happen first.
    fn step(&self, next: Option<&Link<T>>) -> ExResult<Option<T>> {
        let next_value = next.and_then(|n| n.lhs);
        let binds_next = next.map(|n| self.rbp >= n.lbp).unwrap_or(false);
        match (self.state, self.lhs, next_value) {
            (ChainState::PostfixTail | ChainState::PostfixLinked, Some(x), _) => {
                Ok(Some((self.op_sign()?.unary()?)(x)))
            }
            (ChainState::Prefix, _, Some(y)) if binds_next => {
                Ok(Some((self.op_sign()?.unary()?)(y)))
            }
            (ChainState::InfixLinked, Some(x), Some(y)) if binds_next => {
                Ok(Some((self.op_sign()?.bin()?)(x, y)))
            }
            _ => Ok(None),
        }
    }
}

pub type LinkVec<T> = SmallVec<[Link<T>; N_LINKS_ON_STACK]>;

/// Whether the token in front of a postfix operator can be its operand. Decides
/// between an operator in place of a value and a value in place of an operator.
fn ends_operand<T>(prev: Option<&Token<T>>) -> bool {
    match prev {
        Some(Token::Num(_)) => true,
        Some(Token::Op(op)) => op.kind() == SignKind::LeftUnary,
        None => false,
    }
}

/// One transition of the state machine. `head` is the link built last, i.e., the
/// frontmost one so far, and `prev` is the token that will be consumed next. Returns
/// the new head if the token does not fill `head`.
fn transition<T: Real>(
    head: Option<&mut Link<T>>,
    token: &Token<T>,
    prev: Option<&Token<T>>,
    pos: usize,
) -> ExResult<Option<Link<T>>> {
    let state = head.as_ref().map(|h| h.state);
    match (head, token) {
        (None, Token::Num(x)) => Ok(Some(Link::from_num(*x))),
        (Some(h), Token::Num(x)) if h.state.is_pending() => {
            h.fill(*x);
            Ok(None)
        }
        (Some(_), Token::Num(_)) => exerr!(
            ExErrorKind::UnexpectedValue,
            "value at token {} is followed by another value",
            pos
        ),
        (head, Token::Op(op)) => match (state, op.kind()) {
            (None, SignKind::LeftUnary) => {
                Ok(Some(Link::from_op(ChainState::PostfixPending, op)))
            }
            (None, _) => exerr!(
                ExErrorKind::IncompleteExpression,
                "operator {} at the end lacks its operand",
                op.sign.repr()
            ),
            (Some(s), SignKind::LeftUnary) if s.is_pending() => {
                Ok(Some(Link::from_op(ChainState::PostfixPendingLinked, op)))
            }
            (Some(_), SignKind::LeftUnary) if ends_operand(prev) => exerr!(
                ExErrorKind::UnexpectedValue,
                "postfix operator {} at token {} is followed by a value",
                op.sign.repr(),
                pos
            ),
            (Some(_), SignKind::LeftUnary) => exerr!(
                ExErrorKind::UnexpectedOperator,
                "postfix operator {} at token {} where a value is expected",
                op.sign.repr(),
                pos
            ),
            (Some(s), SignKind::RightUnary) if !s.is_pending() => {
                Ok(Some(Link::from_op(ChainState::Prefix, op)))
            }
            (Some(s), SignKind::Infix) if !s.is_pending() => {
                Ok(Some(Link::from_op(ChainState::InfixPending, op)))
            }
            (Some(_), SignKind::RightUnary | SignKind::Infix) => {
                let next_repr = head
                    .and_then(|h| h.sign)
                    .map(|s| s.repr())
                    .unwrap_or("");
                exerr!(
                    ExErrorKind::UnexpectedOperator,
                    "operator {} at token {} is followed by operator {}",
                    op.sign.repr(),
                    pos,
                    next_repr
                )
            }
            (Some(_), SignKind::None | SignKind::Const) => exerr!(
                ExErrorKind::UnknownOperator,
                "{} at token {} is not an operator",
                op.sign.repr(),
                pos
            ),
        },
    }
}

/// Builds the chain by scanning the tokens from the back.
fn build_chain<T: Real>(tokens: &[Token<T>]) -> ExResult<LinkVec<T>> {
    // the head is the last element while building
    let mut links = LinkVec::<T>::new();
    for (pos, token) in tokens.iter().enumerate().rev() {
        let prev = pos.checked_sub(1).and_then(|p| tokens.get(p));
        if let Some(link) = transition(links.last_mut(), token, prev, pos)? {
            links.push(link);
        }
    }
    match links.last().map(|head| (head.state, head.sign)) {
        None => exerr!(ExErrorKind::EmptyExpression, "cannot build chain from nothing"),
        Some((state, sign)) if state.is_pending() => exerr!(
            ExErrorKind::UnexpectedOperator,
            "operator {} at the beginning lacks its left operand",
            sign.map(|s| s.repr()).unwrap_or("")
        ),
        Some(_) => {
            links.reverse();
            Ok(links)
        }
    }
}

/// Reduces the chain until a single number is left. Always the frontmost link that can
/// be reduced is reduced. Its result is written into the continuation and the link is
/// spliced out. A postfix link at the end turns into a number.
///
/// Links in front of the current one wait on a stack. Only the top of the stack can
/// become reducible by a reduction, hence each link is pushed and popped at most once.
pub fn eval_chain<T: Real>(links: LinkVec<T>) -> ExResult<T> {
    let n_links = links.len();
    let mut rest = links.into_iter();
    let mut cur = match rest.next() {
        Some(link) => link,
        None => return exerr!(ExErrorKind::EmptyExpression, "cannot evaluate empty chain"),
    };
    let mut waiting = LinkVec::<T>::new();
    loop {
        let top_value = match waiting.last() {
            Some(top) => top.step(Some(&cur))?,
            None => None,
        };
        if let Some(value) = top_value {
            trace!("reducing link {} of {} to {:?}", waiting.len() - 1, n_links, value);
            waiting.pop();
            cur.fill(value);
            continue;
        }
        match rest.next() {
            Some(next) => waiting.push(std::mem::replace(&mut cur, next)),
            None => match (cur.state, cur.lhs) {
                (ChainState::Num, Some(x)) if waiting.is_empty() => return Ok(x),
                (ChainState::Num, _) => {
                    return exerr!(
                        ExErrorKind::IrreducibleChain,
                        "{} links in front of the last one cannot be reduced",
                        waiting.len()
                    )
                }
                _ => match cur.step(None)? {
                    Some(value) => {
                        trace!("reducing last link to {:?}", value);
                        cur = Link::from_num(value);
                    }
                    None => {
                        return exerr!(
                            ExErrorKind::IrreducibleChain,
                            "last link with operator {} cannot be reduced",
                            cur.op_sign()?.repr()
                        )
                    }
                },
            },
        }
    }
}

/// Flat representation of an expression as chain of links, also called zipper. Each
/// link holds an operator, its left value, and implicitly its continuation. The
/// chain is built from the back of the input with an explicit state machine and
/// evaluated by repeatedly reducing the frontmost link whose binding power permits.
///
/// ```rust
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// #
/// use zipex::prelude::*;
/// let flatex = FlatEx::<f32>::parse("2 * (3 + 4) * 5 - 6 * 7")?;
/// assert!((flatex.eval()? - 28.0).abs() < 1e-6);
/// #
/// #     Ok(())
/// # }
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct FlatEx<T> {
    links: LinkVec<T>,
    text: String,
}

impl<T: Real> FlatEx<T> {
    pub fn links(&self) -> &[Link<T>] {
        &self.links
    }
}

impl<T: Real> Express<T> for FlatEx<T> {
    fn from_tokens(text: &str, tokens: &[Token<T>]) -> ExResult<Self> {
        let links = build_chain(tokens)?;
        trace!("chain of {} has {} links", text, links.len());
        Ok(FlatEx {
            links,
            text: text.to_string(),
        })
    }

    fn eval(&self) -> ExResult<T> {
        eval_chain(self.links.clone())
    }

    fn unparse(&self) -> &str {
        self.text.as_str()
    }
}

/// The expression is displayed as the string it has been parsed from.
impl<T: Real> Display for FlatEx<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.unparse())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::util::assert_float_eq_f32;

    fn states(text: &str) -> Vec<ChainState> {
        FlatEx::<f32>::parse(text)
            .unwrap()
            .links()
            .iter()
            .map(|l| l.state)
            .collect()
    }

    #[test]
    fn test_states() {
        use ChainState::*;
        assert_eq!(states("4"), vec![Num]);
        assert_eq!(states("2+3*4"), vec![InfixLinked, InfixLinked, Num]);
        assert_eq!(states("ln4!"), vec![Prefix, PostfixTail]);
        assert_eq!(states("3!-2"), vec![PostfixLinked, InfixPending, Num]);
        assert_eq!(states("3!!"), vec![PostfixLinked, PostfixPending]);
        assert_eq!(states("-2"), vec![Prefix, Num]);
        for text in ["2+3*4", "ln4!", "3!-2", "3!!", "-2^2"] {
            let flatex = FlatEx::<f32>::parse(text).unwrap();
            let links = flatex.links();
            let last = links.len() - 1;
            for (i, link) in links.iter().enumerate() {
                assert_eq!(link.state.has_next(), i < last);
                assert_eq!(link.sign.is_none(), link.state == Num);
            }
        }
    }

    #[test]
    fn test_chain_fields() {
        let flatex = FlatEx::<f32>::parse("2*(3+4)").unwrap();
        let links = flatex.links();
        assert_eq!(links[0].sign, Some(Sign::Mul));
        assert_eq!(links[0].lhs, Some(2.0));
        assert_eq!((links[0].lbp, links[0].rbp), (2, 2));
        assert_eq!(links[1].sign, Some(Sign::Add));
        assert_eq!((links[1].lbp, links[1].rbp), (11, 11));
        assert_eq!(links[2].lhs, Some(4.0));
    }

    #[test]
    fn test_eval() {
        fn test(text: &str, reference: f32) {
            println!("testing {}...", text);
            assert_float_eq_f32(FlatEx::<f32>::parse(text).unwrap().eval().unwrap(), reference);
        }
        test("2 + 3 - 4 * 5 - 6^2", -51.0);
        test("2 * (3 + 4) * 5 - 6 * 7", 28.0);
        test("(8 - 7 - (3 - 1)) * 3 - 2^(3+1)", -19.0);
        test("4*5+2^(3-1)^2 - 6*(7 + 1)/4 - 9", 15.0);
        test("2^3^2", 512.0);
        test("2-3-4", -5.0);
        test("-2^2", -4.0);
        test("2*-3+1", -5.0);
        test("3!-2", 4.0);
        test("3!!", 720.0);
        test("2^3!+1", 65.0);
        test("(2^3)!/7!", 8.0);
        test("ln e", 1.0);
        test("2^-2*3", 0.75);
        test("2/-3*4", -8.0 / 3.0);
        test("2*-3^2", 18.0);
        test("2^-2^2", 16.0);
        test("2*-3!", -12.0);
    }

    #[test]
    fn test_long_chains() {
        let negs = format!("{}1", "-".repeat(200_001));
        assert_float_eq_f32(FlatEx::<f32>::parse(&negs).unwrap().eval().unwrap(), -1.0);
        let pows = format!("1{}", "^1".repeat(20_000));
        assert_float_eq_f32(FlatEx::<f32>::parse(&pows).unwrap().eval().unwrap(), 1.0);
        let sum = format!("0{}", "+1".repeat(50_000));
        assert_float_eq_f32(FlatEx::<f32>::parse(&sum).unwrap().eval().unwrap(), 50_000.0);
    }

    #[test]
    fn test_eval_keeps_chain() {
        let flatex = FlatEx::<f32>::parse("1+2").unwrap();
        let before = flatex.links().to_vec();
        assert_eq!(flatex.eval().unwrap(), 3.0);
        assert_eq!(flatex.links(), before.as_slice());
    }

    #[test]
    fn test_errors() {
        fn test(text: &str, kind: ExErrorKind) {
            let err = FlatEx::<f32>::parse(text).unwrap_err();
            println!("{} -> {}", text, err);
            assert_eq!(err.kind, kind);
        }
        test("2+", ExErrorKind::IncompleteExpression);
        test("ln", ExErrorKind::IncompleteExpression);
        test("*3", ExErrorKind::UnexpectedOperator);
        test("!3", ExErrorKind::UnexpectedOperator);
        test("2+!3", ExErrorKind::UnexpectedOperator);
        test("!", ExErrorKind::UnexpectedOperator);
        test("2+*3", ExErrorKind::UnexpectedOperator);
        test("ln*3", ExErrorKind::UnexpectedOperator);
        test("2 3", ExErrorKind::UnexpectedValue);
        test("2! 3", ExErrorKind::UnexpectedValue);
        test("3 ln 4", ExErrorKind::UnexpectedValue);
    }

    #[test]
    fn test_irreducible() {
        // an infix link without continuation cannot come out of the builder
        let links: LinkVec<f32> = SmallVec::from_vec(vec![Link {
            state: ChainState::InfixLinked,
            sign: Some(Sign::Add),
            lbp: 1,
            rbp: 1,
            lhs: Some(1.0),
        }]);
        let err = eval_chain(links).unwrap_err();
        assert_eq!(err.kind, ExErrorKind::IrreducibleChain);
    }
}
