pub mod kitt;
