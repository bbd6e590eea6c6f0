use crate::controller::FlightHost;
use mlua::{Lua, Table};
use std::cell::RefCell;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub const HOST_FUNCTIONS: [&str; 8] = [
    "adjust_flight_parameters",
    "pause_script_execution",
    "get_distance_to_origin",
    "get_x_coordinate",
    "get_y_coordinate",
    "get_compass_heading",
    "take_photo",
    "end_flight",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    Read { path: PathBuf, message: String },
    Setup(String),
    Runtime(String),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => {
                write!(f, "failed to read script {}: {}", path.display(), message)
            }
            Self::Setup(message) => write!(f, "failed to prepare script runtime: {}", message),
            Self::Runtime(message) => write!(f, "script error: {}", message),
        }
    }
}

impl Error for ScriptError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSource {
    pub name: String,
    pub code: String,
}

impl ScriptSource {
    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let code = fs::read_to_string(path).map_err(|err| ScriptError::Read {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Ok(Self {
            name: format!("@{}", path.display()),
            code,
        })
    }

    pub fn from_string(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }
}

pub struct ScriptBridge {
    lua: Lua,
}

impl ScriptBridge {
    pub fn new<H: FlightHost + 'static>(host: Rc<RefCell<H>>) -> Result<Self, ScriptError> {
        let lua = Lua::new();
        register_host_functions(&lua, host).map_err(|err| ScriptError::Setup(err.to_string()))?;
        Ok(Self { lua })
    }

    /// Runs the script to completion. `end_flight` does not stop it.
    pub fn execute(&self, source: &ScriptSource) -> Result<(), ScriptError> {
        self.lua
            .load(source.code.as_str())
            .set_name(source.name.as_str())
            .exec()
            .map_err(|err| ScriptError::Runtime(err.to_string()))
    }
}

fn with_host<H, R>(host: &RefCell<H>, f: impl FnOnce(&mut H) -> R) -> mlua::Result<R> {
    let mut host = host.try_borrow_mut().map_err(mlua::Error::external)?;
    Ok(f(&mut host))
}

pub fn register_host_functions<H: FlightHost + 'static>(
    lua: &Lua,
    host: Rc<RefCell<H>>,
) -> mlua::Result<()> {
    let globals: Table = lua.globals();

    let h = Rc::clone(&host);
    globals.set(
        "adjust_flight_parameters",
        lua.create_function(move |_, (x_velocity, y_velocity, yaw_rate): (f64, f64, f64)| {
            with_host(&h, |host| {
                host.adjust_flight_parameters(x_velocity, y_velocity, yaw_rate)
            })
        })?,
    )?;

    let h = Rc::clone(&host);
    globals.set(
        "pause_script_execution",
        lua.create_function(move |_, duration: f64| {
            with_host(&h, |host| host.pause_script_execution(duration))
        })?,
    )?;

    let h = Rc::clone(&host);
    globals.set(
        "get_distance_to_origin",
        lua.create_function(move |_, ()| with_host(&h, |host| host.get_distance_to_origin()))?,
    )?;

    let h = Rc::clone(&host);
    globals.set(
        "get_x_coordinate",
        lua.create_function(move |_, ()| with_host(&h, |host| host.get_x_coordinate()))?,
    )?;

    let h = Rc::clone(&host);
    globals.set(
        "get_y_coordinate",
        lua.create_function(move |_, ()| with_host(&h, |host| host.get_y_coordinate()))?,
    )?;

    let h = Rc::clone(&host);
    globals.set(
        "get_compass_heading",
        lua.create_function(move |_, ()| with_host(&h, |host| host.get_compass_heading()))?,
    )?;

    let h = Rc::clone(&host);
    globals.set(
        "take_photo",
        lua.create_function(move |_, ()| with_host(&h, |host| host.take_photo()))?,
    )?;

    globals.set(
        "end_flight",
        lua.create_function(move |_, ()| with_host(&host, |host| host.end_flight()))?,
    )?;

    Ok(())
}
