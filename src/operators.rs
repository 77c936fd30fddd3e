use crate::{data_type::Real, format_exerr, ExErrorKind, ExResult};

/// Start of the discriminant range of helper signs, i.e., parentheses.
const MIN_SIGN_HELPER: u8 = 1;
/// Start of the discriminant range of constants.
const MIN_SIGN_CONST: u8 = 21;
/// Start of the discriminant range of left-unary (postfix) operators.
const MIN_SIGN_LEFT_UNARY: u8 = 101;
/// Start of the discriminant range of right-unary (prefix) operators.
const MIN_SIGN_RIGHT_UNARY: u8 = 121;
/// Start of the discriminant range of infix operators.
const MIN_SIGN_INFIX: u8 = 141;

/// Everything the lexer can produce besides numbers. The discriminants of the groups
/// helper, constant, left-unary, right-unary, and infix live in disjoint ranges.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(u8)]
pub enum Sign {
    ParenOpen = MIN_SIGN_HELPER,
    ParenClose,
    Pi = MIN_SIGN_CONST,
    E,
    /// factorial `!`
    Fact = MIN_SIGN_LEFT_UNARY,
    /// natural logarithm `ln`
    Ln = MIN_SIGN_RIGHT_UNARY,
    /// unary `+`
    Pos,
    /// unary `-`
    Neg,
    /// unary `+` directly after an operator, binds only its operand
    TightPos,
    /// unary `-` directly after an operator, binds only its operand
    TightNeg,
    Add = MIN_SIGN_INFIX,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Role of a sign in an expression.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub enum SignKind {
    /// Helpers and anything without binding power on either side.
    None,
    Const,
    /// Postfix operator such as `!`.
    LeftUnary,
    /// Prefix operator such as `ln`.
    RightUnary,
    Infix,
}

impl SignKind {
    /// Classification derived purely from a pair of binding powers.
    pub fn from_bp(lbp: u8, rbp: u8) -> SignKind {
        match (lbp, rbp) {
            (0, 0) => SignKind::None,
            (0, _) => SignKind::RightUnary,
            (_, 0) => SignKind::LeftUnary,
            _ => SignKind::Infix,
        }
    }
}

fn make_op_not_available_error(sign: Sign, what: &str) -> crate::ExError {
    format_exerr!(
        ExErrorKind::UnknownOperator,
        "{} operator {} not available",
        what,
        sign.repr()
    )
}

impl Sign {
    /// Resolves a single character of the symbol table.
    pub fn from_symbol(c: char) -> Option<Sign> {
        match c {
            '+' => Some(Sign::Add),
            '-' => Some(Sign::Sub),
            '*' => Some(Sign::Mul),
            '/' => Some(Sign::Div),
            '^' => Some(Sign::Pow),
            '!' => Some(Sign::Fact),
            '(' => Some(Sign::ParenOpen),
            ')' => Some(Sign::ParenClose),
            _ => None,
        }
    }

    /// Resolves a name of the identifier table.
    pub fn from_name(name: &str) -> Option<Sign> {
        match name {
            "ln" => Some(Sign::Ln),
            "pi" => Some(Sign::Pi),
            "e" => Some(Sign::E),
            _ => None,
        }
    }

    pub fn repr(&self) -> &'static str {
        match self {
            Sign::ParenOpen => "(",
            Sign::ParenClose => ")",
            Sign::Pi => "pi",
            Sign::E => "e",
            Sign::Fact => "!",
            Sign::Ln => "ln",
            Sign::Pos | Sign::TightPos | Sign::Add => "+",
            Sign::Neg | Sign::TightNeg | Sign::Sub => "-",
            Sign::Mul => "*",
            Sign::Div => "/",
            Sign::Pow => "^",
        }
    }

    pub fn kind(&self) -> SignKind {
        let discriminant = *self as u8;
        if discriminant < MIN_SIGN_CONST {
            SignKind::None
        } else if discriminant < MIN_SIGN_LEFT_UNARY {
            SignKind::Const
        } else {
            match binding_power(*self) {
                Ok((lbp, rbp)) => SignKind::from_bp(lbp, rbp),
                Err(_) => SignKind::None,
            }
        }
    }

    /// The sign a binary `+` or `-` turns into when it starts an expression.
    pub fn to_unary(self) -> Sign {
        match self {
            Sign::Add => Sign::Pos,
            Sign::Sub => Sign::Neg,
            _ => self,
        }
    }

    /// The sign a binary `+` or `-` turns into when it follows another operator, e.g.,
    /// the `-` in `2^-2*3`. It applies to the next operand and its postfix operators only.
    pub fn to_tight_unary(self) -> Sign {
        match self {
            Sign::Add => Sign::TightPos,
            Sign::Sub => Sign::TightNeg,
            _ => self,
        }
    }

    pub fn constant<T: Real>(&self) -> Option<T> {
        match self {
            Sign::Pi => Some(T::PI()),
            Sign::E => Some(T::E()),
            _ => None,
        }
    }

    /// Returns the function of a unary operator. Arguments outside the mathematical
    /// domain pass through as `NaN` or infinity.
    pub fn unary<T: Real>(&self) -> ExResult<fn(T) -> T> {
        match self {
            Sign::Fact => Ok(|x: T| gamma(x + T::one())),
            Sign::Ln => Ok(|x: T| x.ln()),
            Sign::Pos | Sign::TightPos => Ok(|x: T| x),
            Sign::Neg | Sign::TightNeg => Ok(|x: T| -x),
            _ => Err(make_op_not_available_error(*self, "unary")),
        }
    }

    /// Returns the function of an infix operator.
    pub fn bin<T: Real>(&self) -> ExResult<fn(T, T) -> T> {
        match self {
            Sign::Add => Ok(|a: T, b| a + b),
            Sign::Sub => Ok(|a: T, b| a - b),
            Sign::Mul => Ok(|a: T, b| a * b),
            Sign::Div => Ok(|a: T, b| a / b),
            Sign::Pow => Ok(|a: T, b| a.powf(b)),
            _ => Err(make_op_not_available_error(*self, "binary")),
        }
    }
}

/// Returns the pair (left binding power, right binding power) of a sign. The side with
/// the larger power determines the associativity, e.g., `^` groups from the right.
///
/// # Errors
///
/// Parentheses have no binding power, they shift the power of everything they enclose.
///
pub fn binding_power(sign: Sign) -> ExResult<(u8, u8)> {
    match sign {
        Sign::Pi | Sign::E => Ok((0, 0)),
        Sign::Add | Sign::Sub => Ok((1, 1)),
        Sign::Mul | Sign::Div => Ok((2, 2)),
        Sign::Pow => Ok((4, 3)),
        Sign::Fact => Ok((6, 0)),
        Sign::Ln => Ok((0, 5)),
        Sign::Pos | Sign::Neg => Ok((0, 1)),
        // above the left power of `^` and below the one of `!`
        Sign::TightPos | Sign::TightNeg => Ok((0, 5)),
        Sign::ParenOpen | Sign::ParenClose => Err(format_exerr!(
            ExErrorKind::UnknownOperator,
            "no binding power for {}",
            sign.repr()
        )),
    }
}

/// Lanczos approximation with `g = 7` and 9 coefficients, extended to `z < 0.5` by the
/// reflection formula. Poles yield infinities or huge values, no error.
fn lanczos_gamma(z: f64) -> f64 {
    const G: f64 = 7.0;
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];
    use std::f64::consts::PI;
    if z < 0.5 {
        PI / ((PI * z).sin() * lanczos_gamma(1.0 - z))
    } else {
        let z = z - 1.0;
        let x = COEFFS
            .iter()
            .enumerate()
            .skip(1)
            .fold(COEFFS[0], |acc, (i, c)| acc + c / (z + i as f64));
        let t = z + G + 0.5;
        // t^(z+0.5) * e^-t would overflow to inf * 0 for large z
        (2.0 * PI).sqrt() * ((z + 0.5) * t.ln() - t).exp() * x
    }
}

/// Gamma function of any [`Real`] computed in double precision.
pub fn gamma<T: Real>(x: T) -> T {
    match x.to_f64() {
        Some(z) => {
            let g = lanczos_gamma(z);
            T::from(g).unwrap_or_else(|| {
                if g.is_sign_negative() {
                    T::neg_infinity()
                } else {
                    T::infinity()
                }
            })
        }
        None => T::nan(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::util::{assert_float_eq_f32, assert_float_eq_f64};
    use itertools::Itertools;

    const ALL_SIGNS: [Sign; 15] = [
        Sign::ParenOpen,
        Sign::ParenClose,
        Sign::Pi,
        Sign::E,
        Sign::Fact,
        Sign::Ln,
        Sign::Pos,
        Sign::Neg,
        Sign::TightPos,
        Sign::TightNeg,
        Sign::Add,
        Sign::Sub,
        Sign::Mul,
        Sign::Div,
        Sign::Pow,
    ];

    #[test]
    fn test_kind_follows_bp() {
        for sign in ALL_SIGNS {
            let kind = sign.kind();
            match binding_power(sign) {
                Ok((lbp, rbp)) if kind != SignKind::Const => {
                    assert_eq!(kind, SignKind::from_bp(lbp, rbp), "{:?}", sign)
                }
                Ok((lbp, rbp)) => assert_eq!((lbp, rbp), (0, 0)),
                Err(_) => assert_eq!(kind, SignKind::None),
            }
        }
        assert_eq!(Sign::Fact.kind(), SignKind::LeftUnary);
        assert_eq!(Sign::Ln.kind(), SignKind::RightUnary);
        assert_eq!(Sign::Neg.kind(), SignKind::RightUnary);
        assert_eq!(Sign::Pow.kind(), SignKind::Infix);
        assert_eq!(Sign::Pi.kind(), SignKind::Const);
        assert_eq!(Sign::ParenClose.kind(), SignKind::None);
    }

    #[test]
    fn test_disjoint_ranges() {
        for (s1, s2) in ALL_SIGNS.iter().zip(ALL_SIGNS.iter().skip(1)) {
            assert!((*s1 as u8) < (*s2 as u8));
        }
        // sorted by discriminant, each kind forms one contiguous block
        let kinds = ALL_SIGNS.iter().map(|s| s.kind()).dedup().collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                SignKind::None,
                SignKind::Const,
                SignKind::LeftUnary,
                SignKind::RightUnary,
                SignKind::Infix
            ]
        );
    }

    #[test]
    fn test_bp_table() {
        assert_eq!(binding_power(Sign::Add).unwrap(), (1, 1));
        assert_eq!(binding_power(Sign::Div).unwrap(), (2, 2));
        assert_eq!(binding_power(Sign::Pow).unwrap(), (4, 3));
        assert_eq!(binding_power(Sign::Fact).unwrap(), (6, 0));
        assert_eq!(binding_power(Sign::Ln).unwrap(), (0, 5));
        assert_eq!(binding_power(Sign::Neg).unwrap(), (0, 1));
        let (_, rbp_tight) = binding_power(Sign::TightNeg).unwrap();
        let (lbp_pow, _) = binding_power(Sign::Pow).unwrap();
        let (lbp_fact, _) = binding_power(Sign::Fact).unwrap();
        assert!(lbp_pow < rbp_tight && rbp_tight < lbp_fact);
        let err = binding_power(Sign::ParenOpen).unwrap_err();
        assert_eq!(err.kind, ExErrorKind::UnknownOperator);
    }

    #[test]
    fn test_functions() {
        assert_float_eq_f32((Sign::Fact.unary::<f32>().unwrap())(4.0), 24.0);
        assert_float_eq_f32((Sign::Neg.unary::<f32>().unwrap())(4.0), -4.0);
        assert_float_eq_f32((Sign::TightNeg.unary::<f32>().unwrap())(4.0), -4.0);
        assert_eq!(Sign::Sub.to_tight_unary(), Sign::TightNeg);
        assert_eq!(Sign::Mul.to_tight_unary(), Sign::Mul);
        assert_float_eq_f32((Sign::Pow.bin::<f32>().unwrap())(2.0, 10.0), 1024.0);
        assert!(Sign::Add.unary::<f32>().is_err());
        assert!(Sign::Ln.bin::<f64>().is_err());
        assert!((Sign::Ln.unary::<f32>().unwrap())(-1.0).is_nan());
        assert!((Sign::Div.bin::<f32>().unwrap())(1.0, 0.0).is_infinite());
    }

    #[test]
    fn test_gamma() {
        assert_float_eq_f64(gamma(5.0f64), 24.0);
        assert_float_eq_f64(gamma(1.0f64), 1.0);
        assert!((gamma(0.5f64) - std::f64::consts::PI.sqrt()).abs() < 1e-10);
        assert!((gamma(-0.5f64) + 2.0 * std::f64::consts::PI.sqrt()).abs() < 1e-10);
        assert!(gamma(0.0f32).is_infinite());
        assert!(gamma(200.0f32).is_infinite());
        assert_float_eq_f32(gamma(7.0f32), 720.0);
    }
}
