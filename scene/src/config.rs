use std::fs;
use std::path::PathBuf;
use serde::Deserialize;
use toml;

use crate::path::PathEnd;

/// Unit of the rotation angle column in a `.campus` file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub clear_color: [f64; 4],
    /// Samples per pixel for the scene, 1 disables multisampling.
    pub msaa_samples: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            title: "Campus Tour".to_string(),
            clear_color: [0.87, 0.93, 1.0, 0.0],
            msaa_samples: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraSettings {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near_far: [f32; 2],
    /// Fixed aspect ratio as `[width, height]`; independent of the window size.
    pub aspect: [f32; 2],
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov: 45.0,
            near_far: [0.1, 1000.0],
            aspect: [4.0, 3.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathSettings {
    /// Path time units per wall clock second.
    pub time_scale: f32,
    pub end_policy: PathEnd,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            time_scale: 10.0,
            end_policy: PathEnd::Hold,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneSettings {
    pub path: PathBuf,
    pub angle_unit: AngleUnit,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("res/usaskcampus.campus"),
            angle_unit: AngleUnit::Radians,
        }
    }
}

/// A single line of text drawn over the scene every frame.
///
/// The position lives in a virtual 800x600 screen with the origin in the bottom left corner,
/// `size` is the glyph height in the same units.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub text: String,
    pub position: [f32; 2],
    pub size: f32,
}

impl TextLabel {
    pub const VIRTUAL_WIDTH: f32 = 800.0;
    pub const VIRTUAL_HEIGHT: f32 = 600.0;

    /// Maps the label onto a screen of `width` x `height` points with a top left origin.
    ///
    /// Returns the top left corner of the text box and the scaled glyph height.
    pub fn screen_rect(&self, width: f32, height: f32) -> ([f32; 2], f32) {
        let sx = width / Self::VIRTUAL_WIDTH;
        let sy = height / Self::VIRTUAL_HEIGHT;
        let size = self.size * sy;
        let x = self.position[0] * sx;
        let y = height - self.position[1] * sy - size;
        ([x, y], size)
    }
}

impl Default for TextLabel {
    fn default() -> Self {
        Self {
            text: "CAMPUS TOUR".to_string(),
            position: [500.0, 50.0],
            size: 30.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub window: WindowSettings,
    pub camera: CameraSettings,
    pub path: PathSettings,
    pub scene: SceneSettings,
    pub label: TextLabel,
    pub show_info: bool,
}

impl Config {
    pub fn new(config_path: &str) -> Result<Self, String> {
        let toml_str = fs::read_to_string(config_path)
            .map_err(|e| format!("Could not find/read config file: {}", e))?;
        Self::from_str(&toml_str)
    }

    pub fn from_str(toml_str: &str) -> Result<Self, String> {
        let toml: toml::Value = toml::from_str(toml_str)
            .map_err(|e| format!("Could not parse TOML: {}", e))?;

        let window = load_window_config(toml.get("window"))?;
        let camera = load_camera_config(toml.get("camera"))?;
        let path = load_path_config(toml.get("path"))?;
        let scene = load_scene_config(toml.get("scene"))?;
        let label = load_label_config(toml.get("label"))?;

        let show_info = match toml.get("overlay").and_then(|v| v.get("show_info")) {
            Some(value) => value.as_bool().ok_or("Expected bool for overlay show_info")?,
            None => false,
        };

        Ok(Self {
            window,
            camera,
            path,
            scene,
            label,
            show_info,
        })
    }
}

fn as_number(value: &toml::Value) -> Option<f64> {
    value.as_float().or_else(|| value.as_integer().map(|i| i as f64))
}

fn parse_array(value: &toml::Value, len: usize) -> Result<Vec<f64>, String> {
    let array = value.as_array().ok_or("Expected array")?;
    if array.len() != len {
        return Err(format!("Expected array of {} numbers, got {}", len, array.len()));
    }
    array.iter()
        .map(|v| as_number(v).ok_or_else(|| "Expected number".to_string()))
        .collect()
}

fn get_number(table: &toml::Value, key: &str) -> Result<Option<f64>, String> {
    match table.get(key) {
        Some(value) => as_number(value)
            .map(Some)
            .ok_or_else(|| format!("Expected number for {}", key)),
        None => Ok(None),
    }
}

fn get_string(table: &toml::Value, key: &str) -> Result<Option<String>, String> {
    match table.get(key) {
        Some(value) => value.as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| format!("Expected string for {}", key)),
        None => Ok(None),
    }
}

fn load_window_config(value: Option<&toml::Value>) -> Result<WindowSettings, String> {
    let mut window = WindowSettings::default();
    let Some(value) = value else {
        log::info!("No window section in config, using defaults");
        return Ok(window);
    };

    if let Some(width) = get_number(value, "width")? {
        window.width = width as u32;
    }
    if let Some(height) = get_number(value, "height")? {
        window.height = height as u32;
    }
    if window.width == 0 || window.height == 0 {
        return Err("Window size must be positive".to_string());
    }
    if let Some(title) = get_string(value, "title")? {
        window.title = title;
    }
    if let Some(color) = value.get("clear_color") {
        let color = parse_array(color, 4)?;
        window.clear_color = [color[0], color[1], color[2], color[3]];
    }
    if let Some(samples) = get_number(value, "msaa_samples")? {
        window.msaa_samples = samples as u32;
    }
    if ![1, 2, 4, 8, 16].contains(&window.msaa_samples) {
        return Err("Window msaa_samples must be 1, 2, 4, 8 or 16".to_string());
    }
    Ok(window)
}

fn load_camera_config(value: Option<&toml::Value>) -> Result<CameraSettings, String> {
    let mut camera = CameraSettings::default();
    let Some(value) = value else {
        log::info!("No camera section in config, using defaults");
        return Ok(camera);
    };

    if let Some(fov) = get_number(value, "fov")? {
        camera.fov = fov as f32;
    }
    if !(camera.fov > 0.0 && camera.fov < 180.0) {
        return Err("Camera fov must be between 0 and 180 degrees".to_string());
    }
    // Near and far are only needed in edge cases, keep the defaults when missing
    match value.get("near_far") {
        Some(near_far) => {
            let near_far = parse_array(near_far, 2)?;
            camera.near_far = [near_far[0] as f32, near_far[1] as f32];
        }
        None => log::info!("No near_far defined in config, using default values"),
    }
    if !(camera.near_far[0] > 0.0 && camera.near_far[1] > camera.near_far[0]) {
        return Err("Camera near_far must satisfy 0 < near < far".to_string());
    }
    if let Some(aspect) = value.get("aspect") {
        let aspect = parse_array(aspect, 2)?;
        if aspect[0] <= 0.0 || aspect[1] <= 0.0 {
            return Err("Camera aspect must be positive".to_string());
        }
        camera.aspect = [aspect[0] as f32, aspect[1] as f32];
    }
    Ok(camera)
}

fn load_path_config(value: Option<&toml::Value>) -> Result<PathSettings, String> {
    let mut path = PathSettings::default();
    let Some(value) = value else {
        log::info!("No path section in config, using defaults");
        return Ok(path);
    };

    if let Some(time_scale) = get_number(value, "time_scale")? {
        if time_scale <= 0.0 {
            return Err("Path time_scale must be positive".to_string());
        }
        path.time_scale = time_scale as f32;
    }
    if let Some(policy) = value.get("end_policy") {
        path.end_policy = policy.clone().try_into()
            .map_err(|_| "Expected \"hold\" or \"extrapolate\" for path end_policy".to_string())?;
    }
    Ok(path)
}

fn load_scene_config(value: Option<&toml::Value>) -> Result<SceneSettings, String> {
    let mut scene = SceneSettings::default();
    let Some(value) = value else {
        log::info!("No scene section in config, using {}", scene.path.display());
        return Ok(scene);
    };

    if let Some(path) = get_string(value, "path")? {
        if path.is_empty() {
            return Err("Scene path is empty".to_string());
        }
        scene.path = PathBuf::from(path);
    }
    if let Some(unit) = value.get("angle_unit") {
        scene.angle_unit = unit.clone().try_into()
            .map_err(|_| "Expected \"radians\" or \"degrees\" for scene angle_unit".to_string())?;
    }
    Ok(scene)
}

fn load_label_config(value: Option<&toml::Value>) -> Result<TextLabel, String> {
    let mut label = TextLabel::default();
    let Some(value) = value else {
        return Ok(label);
    };

    if let Some(text) = get_string(value, "text")? {
        label.text = text;
    }
    if let Some(position) = value.get("position") {
        let position = parse_array(position, 2)?;
        label.position = [position[0] as f32, position[1] as f32];
    }
    if let Some(size) = get_number(value, "size")? {
        if size <= 0.0 {
            return Err("Label size must be positive".to_string());
        }
        label.size = size as f32;
    }
    Ok(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("");
        assert!(config.is_ok());
        let config = config.expect("Could not unwrap config");
        assert_eq!(config, Config::default());
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 768);
        assert_eq!(config.window.clear_color, [0.87, 0.93, 1.0, 0.0]);
        assert_eq!(config.camera.near_far, [0.1, 1000.0]);
        assert_eq!(config.path.time_scale, 10.0);
        assert_eq!(config.path.end_policy, PathEnd::Hold);
        assert!(!config.show_info);
    }

    #[test]
    fn test_invalid_toml() {
        let config = Config::from_str("[window\nwidth = 3");
        assert!(config.is_err());
    }

    #[test]
    fn test_window_section() {
        let config = Config::from_str("[window]\nwidth = 800\nheight = 600\ntitle = \"Tour\"\nclear_color = [0.0, 0.0, 0.0, 1]");
        let config = config.expect("Could not unwrap config");
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.window.title, "Tour");
        assert_eq!(config.window.clear_color, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_window_zero_size() {
        let config = Config::from_str("[window]\nwidth = 0");
        assert!(config.is_err());
    }

    #[test]
    fn test_window_msaa_samples() {
        assert_eq!(Config::default().window.msaa_samples, 4);
        let config = Config::from_str("[window]\nmsaa_samples = 1").expect("Could not unwrap config");
        assert_eq!(config.window.msaa_samples, 1);
        assert!(Config::from_str("[window]\nmsaa_samples = 3").is_err());
        assert!(Config::from_str("[window]\nmsaa_samples = 0").is_err());
    }

    #[test]
    fn test_clear_color_wrong_length() {
        let config = Config::from_str("[window]\nclear_color = [0.1, 0.2, 0.3]");
        assert!(config.is_err());
    }

    #[test]
    fn test_camera_missing_near_far() {
        let config = Config::from_str("[camera]\nfov = 60.0");
        let config = config.expect("Could not unwrap config");
        assert_eq!(config.camera.fov, 60.0);
        assert_eq!(config.camera.near_far, [0.1, 1000.0]);
    }

    #[test]
    fn test_camera_invalid_near_far() {
        let config = Config::from_str("[camera]\nnear_far = [10.0, 1.0]");
        assert!(config.is_err());
    }

    #[test]
    fn test_camera_fov_type() {
        let config = Config::from_str("[camera]\nfov = \"wide\"");
        assert!(config.is_err());
    }

    #[test]
    fn test_path_section() {
        let config = Config::from_str("[path]\ntime_scale = 5\nend_policy = \"extrapolate\"");
        let config = config.expect("Could not unwrap config");
        assert_eq!(config.path.time_scale, 5.0);
        assert_eq!(config.path.end_policy, PathEnd::Extrapolate);
    }

    #[test]
    fn test_path_unknown_policy() {
        let config = Config::from_str("[path]\nend_policy = \"loop\"");
        assert!(config.is_err());
    }

    #[test]
    fn test_path_negative_time_scale() {
        let config = Config::from_str("[path]\ntime_scale = -1.0");
        assert!(config.is_err());
    }

    #[test]
    fn test_scene_section() {
        let config = Config::from_str("[scene]\npath = \"assets/campus.campus\"\nangle_unit = \"degrees\"");
        let config = config.expect("Could not unwrap config");
        assert_eq!(config.scene.path, PathBuf::from("assets/campus.campus"));
        assert_eq!(config.scene.angle_unit, AngleUnit::Degrees);
    }

    #[test]
    fn test_scene_empty_path() {
        let config = Config::from_str("[scene]\npath = \"\"");
        assert!(config.is_err());
    }

    #[test]
    fn test_label_and_overlay() {
        let config = Config::from_str("[label]\ntext = \"HELLO\"\nposition = [10, 20]\nsize = 12\n[overlay]\nshow_info = true");
        let config = config.expect("Could not unwrap config");
        assert_eq!(config.label.text, "HELLO");
        assert_eq!(config.label.position, [10.0, 20.0]);
        assert_eq!(config.label.size, 12.0);
        assert!(config.show_info);
    }

    #[test]
    fn test_label_screen_rect() {
        let label = TextLabel::default();
        // 800x600 virtual space maps 1:1, origin flips to the top
        let ([x, y], size) = label.screen_rect(800.0, 600.0);
        assert_eq!(x, 500.0);
        assert_eq!(size, 30.0);
        assert_eq!(y, 600.0 - 50.0 - 30.0);

        let ([x, y], size) = label.screen_rect(1600.0, 1200.0);
        assert_eq!(x, 1000.0);
        assert_eq!(size, 60.0);
        assert_eq!(y, 1200.0 - 100.0 - 60.0);
    }
}
