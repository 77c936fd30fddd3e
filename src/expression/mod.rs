use crate::{data_type::Real, lexer, parser, parser::Token, ExResult};

pub mod deep;
pub mod flat;
#[cfg(feature = "serde")]
mod serde;

/// Expressions implementing this trait can be parsed from strings, evaluated, and
/// unparsed, i.e., transformed into a string representation. Both representations of
/// this crate, the tree [`DeepEx`](deep::DeepEx) and the chain
/// [`FlatEx`](flat::FlatEx), compute the same values.
pub trait Express<T>
where
    T: Real,
    Self: Sized,
{
    /// Parses a string into an expression.
    ///
    /// # Errors
    ///
    /// An [`ExError`](crate::ExError) is returned if the string cannot be lexed or
    /// does not form a valid expression.
    ///
    fn parse(text: &str) -> ExResult<Self> {
        let atoms = lexer::tokenize::<T>(text)?;
        let tokens = parser::atoms_to_tokens(&atoms)?;
        Self::from_tokens(text, &tokens)
    }

    /// Builds the expression from tokens that have already been processed by
    /// [`atoms_to_tokens`](crate::parser::atoms_to_tokens). The text is only kept for
    /// unparsing.
    ///
    /// # Errors
    ///
    /// The tokens do not form a valid expression, e.g., two values are adjacent or an
    /// operator lacks an operand.
    ///
    fn from_tokens(text: &str, tokens: &[Token<T>]) -> ExResult<Self>;

    /// Evaluates the expression. Domain violations such as `ln(-1)` or `1/0` are not
    /// errors, they result in `NaN` or infinities.
    fn eval(&self) -> ExResult<T>;

    /// Returns the string the expression has been created from.
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// #
    /// use zipex::prelude::*;
    /// let deepex = DeepEx::<f32>::parse("3! - ln(5-1)")?;
    /// assert_eq!(format!("{}", deepex), "3! - ln(5-1)");
    /// #
    /// #     Ok(())
    /// # }
    /// ```
    ///
    fn unparse(&self) -> &str;
}
