use bevy::math::Vec3;
use bevy_egui::egui;

#[derive(Debug, Clone, PartialEq)]
pub struct Vector3Field {
    pub label: String,
    pub x: String,
    pub y: String,
    pub z: String,
}

impl Vector3Field {
    pub fn new(label: impl Into<String>, defaults: [f32; 3]) -> Self {
        let [x, y, z] = defaults.map(|value| value.to_string());
        Self {
            label: label.into(),
            x,
            y,
            z,
        }
    }

    /// Empty or unparsable components read as zero.
    pub fn value(&self) -> Vec3 {
        Vec3::new(
            parse_component(&self.x),
            parse_component(&self.y),
            parse_component(&self.z),
        )
    }
}

fn parse_component(text: &str) -> f32 {
    text.trim().parse::<f32>().unwrap_or(0.0)
}

pub fn accepts_numeric(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let mut seen_point = false;
    digits.chars().all(|c| match c {
        '0'..='9' => true,
        '.' if !seen_point => {
            seen_point = true;
            true
        }
        _ => false,
    })
}

pub fn vector3_field(ui: &mut egui::Ui, field: &mut Vector3Field) -> bool {
    ui.label(field.label.clone());
    ui.horizontal(|ui| {
        numeric_input(ui, "x", &mut field.x);
        numeric_input(ui, "y", &mut field.y);
        numeric_input(ui, "z", &mut field.z);
        ui.button("Apply").clicked()
    })
    .inner
}

fn numeric_input(ui: &mut egui::Ui, axis: &str, text: &mut String) {
    ui.label(axis);
    let mut edited = text.clone();
    let response = ui.add(egui::TextEdit::singleline(&mut edited).desired_width(56.0));
    if response.changed() && accepts_numeric(&edited) {
        *text = edited;
    }
}
