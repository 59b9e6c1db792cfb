// Dashboard services
// Services build on the managers: mutations, seeding, settings, container health, widgets and icons.

pub mod container_health;
pub mod icon_resolver;
pub mod mutation_api;
pub mod seed_importer;
pub mod settings_engine;
pub mod widget_registry;
