pub mod gap_events;
