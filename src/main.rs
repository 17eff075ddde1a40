mod viewer;

use anyhow::anyhow;
use bevy::app::AppExit;

fn main() -> anyhow::Result<()> {
    match viewer::editor::run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => Err(anyhow!("viewer exited with code {code}")),
    }
}
