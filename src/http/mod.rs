mod bag;
mod request;

pub use bag::ParameterBag;
pub use request::Request;
