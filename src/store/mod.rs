pub mod directory;
pub mod kinematics;
pub mod schedules;

pub use directory::StationDirectory;
pub use kinematics::VehicleTracker;
pub use schedules::ScheduleStore;
