/// Directory under the platform data dir that holds everything we write.
pub const APP_CONFIG_DIR_NAME: &str = "com.brushmanager";
