use crate::data_type::{cast, Real};
use crate::definitions::N_ATOMS_ON_STACK;
use crate::operators::{Sign, SignKind};
use crate::{exerr, ExErrorKind, ExResult};
use lazy_static::lazy_static;
use log::trace;
use regex::Regex;
use smallvec::SmallVec;

/// Result of lexing, either a number or a sign such as an operator, a parenthesis, or
/// a constant.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Atom<T> {
    Num(T),
    Sign(Sign),
}

impl<T> Atom<T> {
    pub fn is_sign(&self) -> bool {
        matches!(self, Atom::Sign(_))
    }
}

pub type AtomVec<T> = SmallVec<[Atom<T>; N_ATOMS_ON_STACK]>;

/// Returns the leading run of digits and dots of `text` if there is one.
pub fn is_numeric_text(text: &str) -> Option<&str> {
    let n_num_chars = text
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .count();
    if n_num_chars > 0 {
        Some(&text[0..n_num_chars])
    } else {
        None
    }
}

/// Accumulates the value of a number digit by digit, i.e., `v = v*10 + d` before the
/// decimal point and `v += d*10^-k` for the `k`-th digit after it.
///
/// # Errors
///
/// More than one decimal point or no digit at all.
///
pub fn parse_number<T: Real>(num_str: &str) -> ExResult<T> {
    let ten = cast::<T, _>(10u8);
    let mut value = T::zero();
    // number of digits after the decimal point so far, `None` before the point
    let mut n_decimals: Option<i32> = None;
    let mut n_digits = 0usize;
    for c in num_str.chars() {
        if c == '.' {
            if n_decimals.is_some() {
                return exerr!(
                    ExErrorKind::InvalidNumber,
                    "number {} has more than one decimal point",
                    num_str
                );
            }
            n_decimals = Some(0);
        } else if let Some(d) = c.to_digit(10) {
            n_digits += 1;
            let d = cast::<T, _>(d);
            match n_decimals.as_mut() {
                None => value = value * ten + d,
                Some(k) => {
                    *k += 1;
                    value = value + d * ten.powi(-*k);
                }
            }
        } else {
            return exerr!(
                ExErrorKind::InvalidNumber,
                "unexpected character {} in number {}",
                c,
                num_str
            );
        }
    }
    if n_digits == 0 {
        exerr!(ExErrorKind::InvalidNumber, "{} is not a number", num_str)
    } else {
        Ok(value)
    }
}

/// A binary `+` or `-` is a sign of its operand at the beginning and after an opening
/// parenthesis. After operators that expect an operand on their right it is a tight
/// sign that only takes the operand and its postfix operators, e.g., `2^-2*3` is
/// `(2^(-2))*3`.
fn reclassify_sign<T>(sign: Sign, prev: Option<&Atom<T>>) -> Sign {
    match prev {
        None | Some(Atom::Sign(Sign::ParenOpen)) => sign.to_unary(),
        Some(Atom::Sign(s)) if matches!(s.kind(), SignKind::Infix | SignKind::RightUnary) => {
            sign.to_tight_unary()
        }
        _ => sign,
    }
}

/// Scans a text from left to right and returns its atoms.
///
/// # Arguments
///
/// * `text` - text to be lexed, e.g., `3! - ln(5-1) + 7 / 3^2`
///
/// # Errors
///
/// * non-ascii characters,
/// * names other than `ln`, `pi`, and `e`,
/// * symbols other than `+ - * / ^ ! ( )`,
/// * malformed numbers such as `3.4.`.
///
pub fn tokenize<T: Real>(text: &str) -> ExResult<AtomVec<T>> {
    if let Some(c) = text.chars().find(|c| !c.is_ascii()) {
        return exerr!(
            ExErrorKind::NonAscii,
            "only ascii characters are supported, found {}",
            c
        );
    }

    lazy_static! {
        static ref RE_NAME: Regex = Regex::new(r"^[a-zA-Z]+").unwrap();
    }

    let mut res = AtomVec::new();
    let mut cur_offset = 0usize;
    while cur_offset < text.len() {
        let text_rest = &text[cur_offset..];
        // ascii only, hence bytes and chars coincide
        let c = text.as_bytes()[cur_offset] as char;
        if c.is_ascii_whitespace() {
            cur_offset += 1;
            continue;
        }
        let next_atom = if let Some(num_str) = is_numeric_text(text_rest) {
            cur_offset += num_str.len();
            Atom::Num(parse_number(num_str)?)
        } else if let Some(name) = RE_NAME.find(text_rest) {
            let name = name.as_str();
            let sign = match Sign::from_name(name) {
                Some(sign) => sign,
                None => {
                    return exerr!(
                        ExErrorKind::UnknownIdentifier,
                        "unknown identifier {} at position {}",
                        name,
                        cur_offset
                    )
                }
            };
            cur_offset += name.len();
            Atom::Sign(sign)
        } else if let Some(sign) = Sign::from_symbol(c) {
            cur_offset += 1;
            Atom::Sign(reclassify_sign(sign, res.last()))
        } else {
            return exerr!(
                ExErrorKind::UnknownOperator,
                "unknown operator {} at position {}",
                c,
                cur_offset
            );
        };
        res.push(next_atom);
    }
    trace!("lexed {} into {:?}", text, res);
    Ok(res)
}
