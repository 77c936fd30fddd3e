use crate::data_type::Real;
use crate::definitions::{BP_DELTA, MAX_PAREN_DEPTH, N_TOKENS_ON_STACK};
use crate::lexer::Atom;
use crate::operators::{binding_power, Sign, SignKind};
use crate::{exerr, format_exerr, ExErrorKind, ExResult};
use log::trace;
use smallvec::SmallVec;

/// Operator together with its binding powers adjusted to the parenthesis depth it
/// occurs in.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct OpToken {
    pub sign: Sign,
    pub lbp: u8,
    pub rbp: u8,
}

impl OpToken {
    pub fn kind(&self) -> SignKind {
        SignKind::from_bp(self.lbp, self.rbp)
    }
}

/// Unit the structure builders consume. Constants have already been resolved to
/// numbers and parentheses are gone.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Token<T> {
    Num(T),
    Op(OpToken),
}

pub type TokenVec<T> = SmallVec<[Token<T>; N_TOKENS_ON_STACK]>;

/// Adds `depth * BP_DELTA` to a binding power. Zero stays zero such that the
/// classification into prefix, postfix, and infix operators is independent of the depth.
///
/// # Errors
///
/// The adjusted binding power does not fit into a `u8`.
///
pub fn adjust_binding_power(bp: u8, depth: u8) -> ExResult<u8> {
    if bp == 0 {
        return Ok(0);
    }
    depth
        .checked_mul(BP_DELTA)
        .and_then(|delta| delta.checked_add(bp))
        .ok_or_else(|| {
            format_exerr!(
                ExErrorKind::TooDeeplyNested,
                "binding power {} at parenthesis depth {} is too large",
                bp,
                depth
            )
        })
}

/// Resolves constants, removes parentheses, and attaches binding powers to operators.
///
/// # Errors
///
/// * unmatched parentheses,
/// * parentheses nested deeper than [`MAX_PAREN_DEPTH`](MAX_PAREN_DEPTH),
/// * no tokens at all.
///
pub fn atoms_to_tokens<T: Real>(atoms: &[Atom<T>]) -> ExResult<TokenVec<T>> {
    let mut depth = 0u8;
    let mut tokens = TokenVec::new();
    for (i, atom) in atoms.iter().enumerate() {
        match atom {
            Atom::Num(x) => tokens.push(Token::Num(*x)),
            Atom::Sign(Sign::ParenOpen) => {
                if depth == MAX_PAREN_DEPTH {
                    return exerr!(
                        ExErrorKind::TooDeeplyNested,
                        "more than {} nested parentheses at atom {}",
                        MAX_PAREN_DEPTH,
                        i
                    );
                }
                depth += 1;
            }
            Atom::Sign(Sign::ParenClose) => {
                if depth == 0 {
                    return exerr!(
                        ExErrorKind::UnmatchedCloseParen,
                        "too many closing parentheses until atom {}",
                        i
                    );
                }
                depth -= 1;
            }
            Atom::Sign(sign) => match sign.constant() {
                Some(x) => tokens.push(Token::Num(x)),
                None => {
                    let (lbp, rbp) = binding_power(*sign)?;
                    tokens.push(Token::Op(OpToken {
                        sign: *sign,
                        lbp: adjust_binding_power(lbp, depth)?,
                        rbp: adjust_binding_power(rbp, depth)?,
                    }));
                }
            },
        }
    }
    if depth > 0 {
        return exerr!(
            ExErrorKind::UnmatchedOpenParen,
            "{} opening parentheses are not closed",
            depth
        );
    }
    check_token_preconditions(&tokens)?;
    trace!("tokens {:?}", tokens);
    Ok(tokens)
}

/// Tries to give useful error messages before any structure is built.
pub fn check_token_preconditions<T>(tokens: &[Token<T>]) -> ExResult<()> {
    if tokens.is_empty() {
        exerr!(ExErrorKind::EmptyExpression, "cannot parse empty expression")
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lexer::tokenize;

    fn tokens(text: &str) -> ExResult<TokenVec<f32>> {
        atoms_to_tokens(&tokenize::<f32>(text)?)
    }

    fn op(sign: Sign, lbp: u8, rbp: u8) -> Token<f32> {
        Token::Op(OpToken { sign, lbp, rbp })
    }

    #[test]
    fn test_depth_adjustment() {
        let toks = tokens("2*(3+ln(4!))").unwrap();
        assert_eq!(
            toks.as_slice(),
            &[
                Token::Num(2.0),
                op(Sign::Mul, 2, 2),
                Token::Num(3.0),
                op(Sign::Add, 11, 11),
                op(Sign::Ln, 0, 15),
                Token::Num(4.0),
                op(Sign::Fact, 26, 0),
            ]
        );
        let toks = tokens("-(pi)").unwrap();
        assert_eq!(
            toks.as_slice(),
            &[op(Sign::Neg, 0, 1), Token::Num(std::f32::consts::PI)]
        );
    }

    #[test]
    fn test_kind_is_depth_invariant() {
        for sign in [Sign::Fact, Sign::Ln, Sign::Neg, Sign::Pow, Sign::Sub] {
            let (lbp, rbp) = binding_power(sign).unwrap();
            for depth in 0..=MAX_PAREN_DEPTH {
                let token = OpToken {
                    sign,
                    lbp: adjust_binding_power(lbp, depth).unwrap(),
                    rbp: adjust_binding_power(rbp, depth).unwrap(),
                };
                assert_eq!(token.kind(), sign.kind());
            }
        }
    }

    #[test]
    fn test_deeper_binds_tighter() {
        let signs = [Sign::Add, Sign::Mul, Sign::Pow, Sign::Fact, Sign::Ln, Sign::Neg];
        let nonzero_bps = signs
            .iter()
            .flat_map(|s| {
                let (l, r) = binding_power(*s).unwrap();
                [l, r]
            })
            .filter(|bp| *bp > 0)
            .collect::<Vec<_>>();
        for depth in 1..=MAX_PAREN_DEPTH {
            let min_inner = nonzero_bps
                .iter()
                .map(|bp| adjust_binding_power(*bp, depth).unwrap())
                .min()
                .unwrap();
            let max_outer = nonzero_bps
                .iter()
                .map(|bp| adjust_binding_power(*bp, depth - 1).unwrap())
                .max()
                .unwrap();
            assert!(min_inner > max_outer, "depth {}", depth);
        }
        assert!(adjust_binding_power(6, MAX_PAREN_DEPTH + 1).is_err());
    }

    #[test]
    fn test_max_depth() {
        let nested = |depth: usize| {
            format!("{}1+1{}", "(".repeat(depth), ")".repeat(depth))
        };
        assert!(tokens(&nested(MAX_PAREN_DEPTH as usize)).is_ok());
        let err = tokens(&nested(MAX_PAREN_DEPTH as usize + 1)).unwrap_err();
        assert_eq!(err.kind, ExErrorKind::TooDeeplyNested);
    }

    #[test]
    fn test_errors() {
        fn test(text: &str, kind: ExErrorKind, msg_part: &str) {
            let err = tokens(text).unwrap_err();
            println!("msg '{}' should contain '{}'", err.msg, msg_part);
            assert_eq!(err.kind, kind);
            assert!(err.msg.contains(msg_part));
        }
        test("(1+2", ExErrorKind::UnmatchedOpenParen, "not closed");
        test("((1+2)", ExErrorKind::UnmatchedOpenParen, "1 opening");
        test("1+2)", ExErrorKind::UnmatchedCloseParen, "until atom 3");
        test(")+12-(1+1) / (", ExErrorKind::UnmatchedCloseParen, "until atom 0");
        test("", ExErrorKind::EmptyExpression, "empty");
        test("()", ExErrorKind::EmptyExpression, "empty");
    }
}
