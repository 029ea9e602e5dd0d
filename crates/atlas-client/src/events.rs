/// One server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEvent {
    pub event: Option<String>,
    pub id: Option<String>,
    pub data: String,
}

/// Parse a complete `text/event-stream` body into events.
///
/// Multi-line `data:` fields are joined with `\n`; comment lines (`:`) and
/// events without data are dropped.
pub fn parse_event_stream(body: &str) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    let mut event = None;
    let mut id = None;
    let mut data: Vec<&str> = Vec::new();

    for line in body.lines().chain(std::iter::once("")) {
        if line.is_empty() {
            if !data.is_empty() {
                events.push(ServerEvent {
                    event: event.take(),
                    id: id.take(),
                    data: data.join("\n"),
                });
            }
            event = None;
            id = None;
            data.clear();
            continue;
        }
        if line.starts_with(':') {
            continue;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => event = Some(value.to_string()),
            "id" => id = Some(value.to_string()),
            "data" => data.push(value),
            _ => {}
        }
    }

    events
}
