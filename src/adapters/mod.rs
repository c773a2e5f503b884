pub mod document_adapter;
pub mod document_loader;
pub mod openapi_v2;
pub mod openapi_v3;
pub mod route_binder;
