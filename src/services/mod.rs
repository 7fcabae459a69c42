pub mod asset_service;
pub mod folder_creator;
pub mod hierarchy;
pub mod object_client;
pub mod storage_service;
pub mod upload_router;
