pub mod page_routes;
