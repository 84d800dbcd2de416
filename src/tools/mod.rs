pub mod kitt_router;
