//! # Help Text
//!
//! Usage messages for each command. `{p}` in a template is replaced by the guild's prefix.

pub const ADMIN_PREFIX: &str = "`{p}admin prefix <prefix>`";
pub const ADMIN_ROLE: &str = "`{p}admin role (member|officer) <rolename>`";
pub const ADMIN_TWITTER: &str = "`{p}admin twitter (channel|listscreenname|listslug) <value>`";

pub const TWITTER_LIST: &[&str] = &[
    "`{p}twitter list (add|remove) <screen_name>`",
    "`{p}twitter list url`",
];
pub const TWITTER_LASTTWEET: &str = "`{p}twitter lasttweet [screen_name]`";

pub const ACCOUNT_SET: &str = "To set your account details: `{p}{t} set <account_id>`";
pub const ACCOUNT_CLEAR: &str = "To clear your details: `{p}{t} clear`";
pub const ACCOUNT_VIEW: &str = "To view your details: `{p}{t} view`";
pub const ACCOUNT_LIST: &str = "To list all accounts known to this room: `{p}{t} list`";

pub const ACCOUNT_TYPES_HINT: &str =
    "Please see `{p}help <account_type>` to learn how to find each type of account ID!";

pub const STEAMID_HOWTO: &str = concat!(
    "**To get a linkable Valve Steam Community ID:**\n",
    "1) In Steam, click on your display name at the top and click 'Profile'.\n",
    "2) Click on 'Edit Profile'.\n",
    "3) Enter an ID for your profile.\n",
    "4) Scroll down, click Save Changes and fix any errors.\n",
    "5) Here, set the same ID with this bot's steamid set command."
);

pub const BATTLETAG_HOWTO: &str = concat!(
    "**To get your Blizzard battletag:**\n",
    "1) From the Battle.net app, click your display name in the top right.\n",
    "2) Your Battletag is the display name including both the # and the following number."
);

/// Fill in the `{p}` placeholder.
pub fn render(template: &str, prefix: &str) -> String {
    template.replace("{p}", prefix)
}

/// `Usage:` followed by one template per line.
pub fn usage_block<'a>(templates: impl IntoIterator<Item = &'a str>, prefix: &str) -> String {
    let lines: Vec<String> = templates.into_iter().map(|t| render(t, prefix)).collect();
    format!("Usage:\n{}", lines.join("\n"))
}
