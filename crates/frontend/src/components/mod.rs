pub mod device_list;
pub mod events_drawer;
pub mod map_view;
pub mod status_card;
pub mod toolbar;
