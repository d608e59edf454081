pub mod datagram_service;
pub mod page_service;
