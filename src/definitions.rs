/// Binding power added per level of parenthesis nesting.
pub const BP_DELTA: u8 = 10;
/// Largest nesting depth whose adjusted binding powers still fit into a `u8`.
pub const MAX_PAREN_DEPTH: u8 = (u8::MAX - MAX_BASE_BP) / BP_DELTA;
/// Largest height of an expression tree. Building, evaluating, and dropping trees is
/// recursive, hence the height is bounded to keep the stack small. Chains have no
/// such limit.
pub const MAX_TREE_DEPTH: usize = 512;
/// Largest binding power of the table in [`operators`](crate::operators).
pub const MAX_BASE_BP: u8 = 6;

pub const N_ATOMS_ON_STACK: usize = 32;
pub const N_TOKENS_ON_STACK: usize = 32;
pub const N_LINKS_ON_STACK: usize = 16;

/// Absolute tolerance when answers are compared to expected values.
pub const GRADING_TOLERANCE: f32 = 1e-3;
