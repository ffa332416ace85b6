mod assessor;
mod common;
