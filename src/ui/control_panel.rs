/// Discrete interactions the panel emits; the app routes them to the
/// scene runtime before the next frame's evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    SetTimeMinutes(u32),
    ResetNow,
    TogglePlayback,
    SetSpeed(i32),
}

/// Read-only snapshot the app hands the panel each frame.
pub struct PanelView {
    pub location_name: String,
    pub date_label: String,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub period: Option<String>,
    pub mode: &'static str,
    pub playing: bool,
    pub scene_minutes: Option<u32>,
    pub speed: i32,
}

pub struct ControlPanel {
    visible: bool,
    slider_minutes: u32,
    slider_active: bool,
    speed: i32,
    speed_active: bool,
    actions: Vec<PanelAction>,
}

impl ControlPanel {
    pub fn new(initial_speed: i32) -> Self {
        Self {
            visible: true,
            slider_minutes: 12 * 60,
            slider_active: false,
            speed: initial_speed,
            speed_active: false,
            actions: Vec::new(),
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Drain interactions gathered during the last `ui()` run.
    pub fn take_actions(&mut self) -> Vec<PanelAction> {
        std::mem::take(&mut self.actions)
    }

    pub fn ui(&mut self, ctx: &egui::Context, view: &PanelView) {
        if !self.visible {
            return;
        }

        // While the user is not dragging, the controls track the scene.
        if !self.slider_active {
            if let Some(minutes) = view.scene_minutes {
                self.slider_minutes = minutes.min(24 * 60 - 1);
            }
        }
        if !self.speed_active {
            self.speed = view.speed;
        }

        egui::SidePanel::left("time_panel")
            .default_width(280.0)
            .frame(
                egui::Frame::side_top_panel(ctx.style().as_ref())
                    .fill(egui::Color32::from_rgba_unmultiplied(20, 16, 34, 220)),
            )
            .show(ctx, |ui| {
                ui.heading(&view.location_name);
                ui.label(&view.date_label);
                ui.separator();

                match (&view.sunrise, &view.sunset) {
                    (Some(rise), Some(set)) => {
                        ui.label(format!("Sunrise  {rise}"));
                        ui.label(format!("Sunset   {set}"));
                    }
                    _ => {
                        ui.label("Fetching sun times...");
                    }
                }

                if let Some(period) = &view.period {
                    ui.separator();
                    ui.label(egui::RichText::new(period).strong());
                }

                ui.separator();
                ui.label(format!("Time of day  ({})", view.mode));

                let slider = ui.add(
                    egui::Slider::new(&mut self.slider_minutes, 0..=(24 * 60 - 1))
                        .show_value(false),
                );
                ui.label(format_minutes(self.slider_minutes));
                if slider.changed() {
                    self.actions
                        .push(PanelAction::SetTimeMinutes(self.slider_minutes));
                }
                self.slider_active = slider.dragged();

                ui.horizontal(|ui| {
                    if ui.button("Now").clicked() {
                        self.actions.push(PanelAction::ResetNow);
                    }
                    let play_label = if view.playing { "Pause" } else { "Play" };
                    if ui.button(play_label).clicked() {
                        self.actions.push(PanelAction::TogglePlayback);
                    }
                });

                ui.separator();
                ui.label("Timelapse speed (min/s)");
                let speed = ui.add(egui::Slider::new(&mut self.speed, -240..=240));
                if speed.changed() {
                    self.actions.push(PanelAction::SetSpeed(self.speed));
                }
                self.speed_active = speed.dragged();
            });
    }
}

/// 12-hour clock label for a minute-of-day slider value.
fn format_minutes(minutes: u32) -> String {
    let h = minutes / 60;
    let m = minutes % 60;
    let meridiem = if h >= 12 { "PM" } else { "AM" };
    let display_hour = ((h + 11) % 12) + 1;
    format!("{display_hour}:{m:02} {meridiem}")
}

#[cfg(test)]
mod tests {
    use super::{format_minutes, ControlPanel, PanelAction};

    #[test]
    fn minute_labels_use_a_twelve_hour_clock() {
        assert_eq!(format_minutes(0), "12:00 AM");
        assert_eq!(format_minutes(6 * 60 + 32), "6:32 AM");
        assert_eq!(format_minutes(12 * 60), "12:00 PM");
        assert_eq!(format_minutes(19 * 60 + 45), "7:45 PM");
        assert_eq!(format_minutes(23 * 60 + 59), "11:59 PM");
    }

    #[test]
    fn actions_drain_once() {
        let mut panel = ControlPanel::new(60);
        panel.actions.push(PanelAction::ResetNow);

        assert_eq!(panel.take_actions(), vec![PanelAction::ResetNow]);
        assert!(panel.take_actions().is_empty());
    }
}
