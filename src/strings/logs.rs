pub fn config_loaded(user: &str) -> String {
    format!("Loaded configuration for user: {user}")
}

pub const LOGIN_SUCCESS: &str = "Logged in successfully!";

pub fn setting_display_name(name: &str) -> String {
    format!("Setting display name to: {name}")
}

pub fn set_display_name_fail(err: &str) -> String {
    format!("Failed to set display name: {err}")
}

pub const SYNC_LOOP_START: &str = "Starting sync loop...";

pub fn sync_loop_fail(err: &str) -> String {
    format!("Sync loop failed: {err}")
}

pub fn invite_received(room_id: &str) -> String {
    format!("Received invite for room {room_id}")
}

pub fn invite_join_fail(room_id: &str, err: &str) -> String {
    format!("Failed to join room {room_id}: {err}")
}

pub const TWITTER_DISABLED: &str = "No Twitter credentials configured; Twitter commands are disabled";

pub fn scheduler_started(room_id: &str) -> String {
    format!("Twitter scheduler started for room {room_id}")
}

pub fn scheduler_stopped(room_id: &str) -> String {
    format!("Left room {room_id}; Twitter scheduler stopped")
}

pub const NO_ROOMS_AFTER_SYNC: &str = "No joined rooms found after 60s; Twitter schedulers not started";
