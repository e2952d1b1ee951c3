#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Noop,
    Move { forward: f32, strafe: f32 },
    Stop,
    Look { pitch: f32, yaw: f32 },
    Jump,
    Break,
    Place,
    Slot(usize),
    Scroll(f32),
    Wait(u32),
    Pos,
    Inv,
    Block { x: i32, y: i32, z: i32 },
    Save,
    Quit,
    Help,
    InvalidUsage(String),
    Unknown(String),
}

pub const HELP_LINES: &[&str] = &[
    "move <forward> <strafe>  set movement intent, each in -1..1",
    "stop                     clear movement intent",
    "look <dpitch> <dyaw>     turn by the given degrees",
    "jump                     jump if standing on ground",
    "break                    break the targeted block",
    "place                    place the selected block",
    "slot <0-8>               select a hotbar slot",
    "scroll <delta>           scroll the hotbar selection",
    "wait <ticks>             delay the following commands",
    "pos                      print position and target",
    "inv                      print the inventory",
    "block <x> <y> <z>        print the block at a position",
    "save                     save the world now",
    "quit                     save and exit",
];

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Command::Noop;
    }

    let input = trimmed.strip_prefix('/').unwrap_or(trimmed);
    if input.is_empty() {
        return Command::Noop;
    }

    let mut head_tail = input.splitn(2, char::is_whitespace);
    let command = head_tail.next().unwrap_or_default().to_ascii_lowercase();
    let rest = head_tail.next().unwrap_or("").trim();
    let args: Vec<&str> = rest.split_whitespace().collect();

    match command.as_str() {
        "move" => match parse_floats::<2>(&args) {
            Some([forward, strafe]) => Command::Move { forward, strafe },
            None => Command::InvalidUsage("Usage: move <forward> <strafe>".to_string()),
        },
        "stop" => Command::Stop,
        "look" => match parse_floats::<2>(&args) {
            Some([pitch, yaw]) => Command::Look { pitch, yaw },
            None => Command::InvalidUsage("Usage: look <dpitch> <dyaw>".to_string()),
        },
        "jump" => Command::Jump,
        "break" => Command::Break,
        "place" => Command::Place,
        "slot" => match args.as_slice() {
            [slot] => match slot.parse::<usize>() {
                Ok(slot) if slot < 9 => Command::Slot(slot),
                _ => Command::InvalidUsage("Usage: slot <0-8>".to_string()),
            },
            _ => Command::InvalidUsage("Usage: slot <0-8>".to_string()),
        },
        "scroll" => match parse_floats::<1>(&args) {
            Some([delta]) => Command::Scroll(delta),
            None => Command::InvalidUsage("Usage: scroll <delta>".to_string()),
        },
        "wait" => match args.as_slice() {
            [ticks] => match ticks.parse::<u32>() {
                Ok(ticks) => Command::Wait(ticks),
                Err(_) => Command::InvalidUsage("Usage: wait <ticks>".to_string()),
            },
            _ => Command::InvalidUsage("Usage: wait <ticks>".to_string()),
        },
        "pos" => Command::Pos,
        "inv" => Command::Inv,
        "block" => match args.as_slice() {
            [x, y, z] => match (x.parse(), y.parse(), z.parse()) {
                (Ok(x), Ok(y), Ok(z)) => Command::Block { x, y, z },
                _ => Command::InvalidUsage("Usage: block <x> <y> <z>".to_string()),
            },
            _ => Command::InvalidUsage("Usage: block <x> <y> <z>".to_string()),
        },
        "save" => Command::Save,
        "quit" | "exit" => Command::Quit,
        "help" => Command::Help,
        _ => Command::Unknown(input.to_string()),
    }
}

fn parse_floats<const N: usize>(args: &[&str]) -> Option<[f32; N]> {
    if args.len() != N {
        return None;
    }
    let mut values = [0.0; N];
    for (value, arg) in values.iter_mut().zip(args) {
        *value = arg.parse::<f32>().ok().filter(|v| v.is_finite())?;
    }
    Some(values)
}
