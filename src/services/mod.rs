pub mod profile_filter_service;
pub mod profile_list_service;
