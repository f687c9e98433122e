pub mod filter;
pub mod form;
pub mod prelude;
pub mod value;

#[cfg(test)]
mod test_public_api;
