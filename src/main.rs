mod app;
mod clock;
mod config;
mod countdown;
mod daily;
mod layout;
mod page;
mod particles;
mod reveal;
mod surface;
mod theme;
mod timers;

fn main() {
    dioxus::launch(app::App);
}
