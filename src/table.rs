use crate::model::Stream;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};

/// Render the attacked streams and a one line verdict
pub fn render_streams(streams: &[Stream]) -> String {
    if streams.is_empty() {
        return "No streams were found. Please make sure that your target is on an accessible network.".to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

    table.set_header(vec![
        "URL",
        "Device",
        "Address",
        "Port",
        "Auth",
        "Username",
        "Password",
        "Routes",
    ]);

    for stream in streams {
        let url = if stream.available {
            Cell::new(stream.rtsp_url())
                .fg(Color::Green)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new(stream.admin_panel_url())
        };

        let (username, password) = if stream.credentials_found {
            (stream.username.as_str(), stream.password.as_str())
        } else {
            ("not found", "not found")
        };

        let routes = if stream.route_found {
            stream
                .routes
                .iter()
                .map(|r| format!("/{}", r.trim_start_matches('/')))
                .collect::<Vec<String>>()
                .join("\n")
        } else {
            "not found".to_string()
        };

        table.add_row(vec![
            url,
            Cell::new(stream.device.as_deref().unwrap_or("unknown")),
            Cell::new(&stream.address),
            Cell::new(stream.port),
            Cell::new(stream.authentication_type),
            Cell::new(username),
            Cell::new(password),
            Cell::new(routes),
        ]);
    }

    format!("{}\n{}", table, summary(streams))
}

/// Print [`render_streams`] to stdout
pub fn print_streams(streams: &[Stream]) {
    println!("{}", render_streams(streams));
}

fn summary(streams: &[Stream]) -> String {
    match streams.iter().filter(|s| s.available).count() {
        0 => "Streams were found but none were accessed. They are most likely configured with \
              secure credentials and routes. You can try adding entries to the dictionary or \
              generating your own in order to attempt a bruteforce attack on the cameras."
            .to_string(),
        1 => "Successful attack: one device was accessed".to_string(),
        n => format!("Successful attack: {} devices were accessed", n),
    }
}
