pub struct Icons;

impl Icons {
    pub const ROCKET: &str = "🚀";
    pub const SEARCH: &str = "🔍";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const STATS: &str = "📊";
    pub const LINK: &str = "🔗";
    pub const FILE: &str = "📄";
    pub const SHEET: &str = "📑";
    pub const FLASK: &str = "🧪";
    pub const SHIELD: &str = "🛡️";
    pub const DATABASE: &str = "🗄️";
    pub const DEL: &str = "🗑️";
    pub const EMPTY: &str = "∅";
    pub const GLOBE: &str = "🌍";
}
