use num::{traits::FloatConst, Float};
use std::fmt::Debug;

/// Gathers `Float`, `FloatConst`, and `Debug` in one trait.
/// Every type that is used as value needs to implement at least this. The facade
/// functions of this crate use `f32`.
pub trait Real: Float + FloatConst + Debug {}
impl<T: Float + FloatConst + Debug> Real for T {}

/// Converts small integers and the `f64` constants of this crate into `T`. All
/// [`Real`] types can represent those, so the `NaN` fallback is never hit in practice.
pub fn cast<T: Real, U: num::ToPrimitive>(x: U) -> T {
    T::from(x).unwrap_or_else(T::nan)
}
