//! Color space listing command

use anyhow::Result;
use lutfx_ocio::ColorConfig;

pub fn run(config: &ColorConfig, verbose: u8) -> Result<()> {
    if verbose > 0 {
        match config.source() {
            Some(path) => println!("# config: {}", path.display()),
            None => println!("# config: built-in"),
        }
        if !config.has_scene_linear_role() {
            println!("# no scene_linear role, defaulting to {}", config.scene_linear());
        }
    }

    let scene_linear = config.scene_linear();
    for name in config.color_spaces() {
        if name == scene_linear {
            println!("{name} (scene_linear)");
        } else {
            println!("{name}");
        }
    }
    Ok(())
}
