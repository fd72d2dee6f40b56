pub mod decode;
pub(crate) mod text;
