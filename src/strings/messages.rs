//! # Messages
//!
//! Constant strings and format functions for user-facing chat replies.

pub const NO_GUILD: &str = "Please use commands from a room that I'm in.";

pub fn supported_commands(prefix: &str, commands: &[&str]) -> String {
    let listing = commands
        .iter()
        .map(|c| format!("`{prefix}{c}`"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Supported commands: {listing}")
}

pub const NO_HELP: &str = "Sorry, this command does not have a help feature yet!";

// Admin
pub const PREFIX_NOT_SINGLE_CHAR: &str = "Command prefix must be a single character!";
pub const PREFIX_UPDATED: &str = "Command prefix updated!";
pub const MEMBER_ROLE_UPDATED: &str = "Member role name updated!";
pub const OFFICER_ROLE_UPDATED: &str = "Officer role name updated!";

pub fn twitter_setting_updated(key: &str, value: &str) -> String {
    format!("Twitter list key {key} set to value `{value}`!")
}

// Twitter
pub fn request_failed(reason: &str) -> String {
    format!("Sorry, the request didn't work! Reason: `{reason}`")
}

pub const NO_NEW_TWEETS: &str = "No new tweets since last time, sorry!";
pub const LIST_NOT_CONFIGURED: &str =
    "There was a database lookup error! The guild admin needs to set the data.";
pub const DATABASE_ERROR: &str = "There was a database lookup error! Blame the owner!";

pub fn list_member_added(screen_name: &str) -> String {
    format!("Added the Twitter account `{screen_name}` to my follow list!")
}

pub fn list_member_removed(screen_name: &str) -> String {
    format!("Removed the Twitter account `{screen_name}` from my follow list!")
}

// Accounts
pub const ACCOUNT_VALIDATION_FAILED: &str =
    "Failed account ID validation, please check the formatting!";

pub fn account_types(types: &[&str]) -> String {
    format!(
        "The following account types can be used:\n`{}`",
        types.join(" ")
    )
}

pub fn account_hint(prefix: &str, account_type: &str) -> String {
    format!("Use `{prefix}help {account_type}` to learn how to set your {account_type}.")
}

pub fn account_updated(account_type: &str, who: &str) -> String {
    format!("Updated {account_type} account for {who}!")
}

pub fn account_cleared(account_type: &str, who: &str) -> String {
    format!("Cleared {account_type} account for {who}!")
}

pub fn account_not_set(account_type: &str) -> String {
    format!("You haven't set your {account_type} yet!")
}

pub fn account_list(account_type: &str, entries: &[String]) -> String {
    if entries.is_empty() {
        return format!("No members have registered their {account_type} yet!");
    }
    format!("**{account_type} list**\n{}", entries.join("\n"))
}

pub fn steam_profile_link(steam_id: &str) -> String {
    format!("[{steam_id}](https://steamcommunity.com/id/{steam_id})")
}
