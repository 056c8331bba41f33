use crate::surface::{Decoration, Surface};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeBand {
    Sunrise,
    Day,
    Afternoon,
    Sunset,
    Night,
}

impl ThemeBand {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=6 => ThemeBand::Sunrise,
            7..=11 => ThemeBand::Day,
            12..=16 => ThemeBand::Afternoon,
            17..=18 => ThemeBand::Sunset,
            _ => ThemeBand::Night,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visibility {
    pub birds: bool,
    pub planes: bool,
    pub stars: bool,
    pub rain: bool,
    pub lightning: bool,
}

impl Visibility {
    pub fn of(&self, decoration: Decoration) -> bool {
        match decoration {
            Decoration::Birds => self.birds,
            Decoration::Planes => self.planes,
            Decoration::ShootingStars => self.stars,
            Decoration::Rain => self.rain,
            Decoration::Lightning => self.lightning,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThemeDescriptor {
    pub band: ThemeBand,
    pub sky_gradient: &'static str,
    pub sea_gradient: &'static str,
    pub celestial_color: &'static str,
    pub celestial_size: &'static str,
    pub celestial_blur: &'static str,
    pub celestial_top: &'static str,
    pub celestial_left: &'static str,
    pub bird_color: &'static str,
    pub plane_color: &'static str,
    pub particle_opacity: f32,
    pub visibility: Visibility,
}

const DAYTIME: Visibility = Visibility {
    birds: true,
    planes: true,
    stars: false,
    rain: false,
    lightning: false,
};

const SUNRISE: ThemeDescriptor = ThemeDescriptor {
    band: ThemeBand::Sunrise,
    sky_gradient: "linear-gradient(to bottom, #FFDAB9 0%, #FFB6C1 50%, #B0E0E6 100%)",
    sea_gradient: "linear-gradient(to top, #4682B4, #6495ED)",
    celestial_color: "#FF8C00",
    celestial_size: "90px",
    celestial_blur: "30px",
    celestial_top: "30%",
    celestial_left: "20%",
    bird_color: "#555",
    plane_color: "#eee",
    particle_opacity: 0.6,
    visibility: DAYTIME,
};

const DAY: ThemeDescriptor = ThemeDescriptor {
    band: ThemeBand::Day,
    sky_gradient: "linear-gradient(to bottom, #87CEEB 0%, #ADD8E6 70%, #E0FFFF 100%)",
    sea_gradient: "linear-gradient(to top, #1E90FF, #4169E1)",
    celestial_color: "#FFD700",
    celestial_size: "100px",
    celestial_blur: "40px",
    celestial_top: "15%",
    celestial_left: "50%",
    bird_color: "#333",
    plane_color: "#fff",
    particle_opacity: 0.7,
    visibility: DAYTIME,
};

const AFTERNOON: ThemeDescriptor = ThemeDescriptor {
    band: ThemeBand::Afternoon,
    sky_gradient: "linear-gradient(to bottom, #6A5ACD 0%, #483D8B 60%, #ADD8E6 100%)",
    sea_gradient: "linear-gradient(to top, #000080, #191970)",
    celestial_color: "#FFA500",
    celestial_size: "95px",
    celestial_blur: "35px",
    celestial_top: "20%",
    celestial_left: "80%",
    bird_color: "#444",
    plane_color: "#ccc",
    particle_opacity: 0.6,
    visibility: DAYTIME,
};

const SUNSET: ThemeDescriptor = ThemeDescriptor {
    band: ThemeBand::Sunset,
    sky_gradient: "linear-gradient(to bottom, #FF6347 0%, #FF4500 50%, #8B0000 100%)",
    sea_gradient: "linear-gradient(to top, #4169E1, #6A5ACD)",
    celestial_color: "#FFD700",
    celestial_size: "110px",
    celestial_blur: "50px",
    celestial_top: "40%",
    celestial_left: "50%",
    bird_color: "#222",
    plane_color: "#aaa",
    particle_opacity: 0.5,
    visibility: DAYTIME,
};

const NIGHT: ThemeDescriptor = ThemeDescriptor {
    band: ThemeBand::Night,
    sky_gradient: "linear-gradient(to bottom, #000022 0%, #000044 50%, #000066 100%)",
    sea_gradient: "linear-gradient(to top, #000022, #000044)",
    celestial_color: "#E0E0E0",
    celestial_size: "70px",
    celestial_blur: "20px",
    celestial_top: "10%",
    celestial_left: "70%",
    bird_color: "#333",
    plane_color: "#ccc",
    particle_opacity: 0.1,
    visibility: Visibility {
        birds: false,
        planes: false,
        stars: true,
        rain: false,
        lightning: false,
    },
};

pub fn select_theme(hour: u32) -> ThemeDescriptor {
    match ThemeBand::from_hour(hour) {
        ThemeBand::Sunrise => SUNRISE,
        ThemeBand::Day => DAY,
        ThemeBand::Afternoon => AFTERNOON,
        ThemeBand::Sunset => SUNSET,
        ThemeBand::Night => NIGHT,
    }
}

impl ThemeDescriptor {
    /// Storm overlay: rain and lightning on top of whatever the band shows.
    pub fn with_storm(mut self) -> Self {
        self.visibility.rain = true;
        self.visibility.lightning = true;
        self
    }
}

pub fn apply_theme<S: Surface>(surface: &mut S, theme: &ThemeDescriptor) {
    surface.set_style_var("--sky-gradient", theme.sky_gradient);
    surface.set_style_var("--sea-gradient", theme.sea_gradient);
    surface.set_style_var("--celestial-color", theme.celestial_color);
    surface.set_style_var("--celestial-size", theme.celestial_size);
    surface.set_style_var("--celestial-blur", theme.celestial_blur);
    surface.set_style_var("--celestial-top", theme.celestial_top);
    surface.set_style_var("--celestial-left", theme.celestial_left);
    surface.set_style_var("--bird-color", theme.bird_color);
    surface.set_style_var("--plane-color", theme.plane_color);
    surface.set_style_var("--particle-opacity", &theme.particle_opacity.to_string());
    surface.set_style_var("--particle-display", "block");
    surface.set_style_var("--sky-height", "70%");
    surface.set_style_var("--sea-height", "30%");
    for decoration in Decoration::ALL {
        surface.set_decoration_visible(decoration, theme.visibility.of(decoration));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::fake::FakeSurface;
    use pretty_assertions::assert_eq;

    #[test]
    fn band_boundaries_are_closed_open() {
        let bands: Vec<ThemeBand> = (0..24).map(ThemeBand::from_hour).collect();
        assert_eq!(bands[4], ThemeBand::Night);
        assert_eq!(bands[5], ThemeBand::Sunrise);
        assert_eq!(bands[6], ThemeBand::Sunrise);
        assert_eq!(bands[7], ThemeBand::Day);
        assert_eq!(bands[11], ThemeBand::Day);
        assert_eq!(bands[12], ThemeBand::Afternoon);
        assert_eq!(bands[16], ThemeBand::Afternoon);
        assert_eq!(bands[17], ThemeBand::Sunset);
        assert_eq!(bands[18], ThemeBand::Sunset);
        assert_eq!(bands[19], ThemeBand::Night);
        assert_eq!(bands[23], ThemeBand::Night);
    }

    #[test]
    fn every_hour_maps_to_its_band_descriptor() {
        for hour in 0..24 {
            let theme = select_theme(hour);
            assert_eq!(theme.band, ThemeBand::from_hour(hour), "hour {hour}");
        }
    }

    #[test]
    fn only_night_shows_stars_and_hides_birds_and_planes() {
        for hour in 0..24 {
            let theme = select_theme(hour);
            let night = theme.band == ThemeBand::Night;
            assert_eq!(theme.visibility.stars, night, "hour {hour}");
            assert_eq!(theme.visibility.birds, !night, "hour {hour}");
            assert_eq!(theme.visibility.planes, !night, "hour {hour}");
            assert!(!theme.visibility.rain);
            assert!(!theme.visibility.lightning);
        }
    }

    #[test]
    fn apply_writes_style_vars_and_toggles_decorations() {
        let mut surface = FakeSurface::default();
        apply_theme(&mut surface, &select_theme(21).with_storm());

        assert_eq!(surface.style_vars["--celestial-color"], "#E0E0E0");
        assert_eq!(surface.style_vars["--particle-opacity"], "0.1");
        assert_eq!(surface.style_vars["--sky-height"], "70%");
        assert_eq!(surface.decorations[&Decoration::ShootingStars], true);
        assert_eq!(surface.decorations[&Decoration::Birds], false);
        assert_eq!(surface.decorations[&Decoration::Rain], true);
        assert_eq!(surface.decorations[&Decoration::Lightning], true);
    }
}
