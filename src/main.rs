use std::path::Path;

use jovian::{
    AppConfig, AppError, CONFIG_FILE_NAME, Camera, Color, Config, Material, Planet, SpotLight,
    Transform, init_logging, run_with_config,
};

fn main() -> Result<(), AppError> {
    let config_path = Path::new(CONFIG_FILE_NAME);
    let config = Config::load_or_default(config_path)?;
    init_logging(&config.debug);

    if config_path.exists() {
        tracing::info!(path = %config_path.display(), "loaded config");
    } else {
        tracing::info!("no {CONFIG_FILE_NAME} found, using defaults");
    }

    run_with_config(AppConfig::from(&config.window), move |ctx| {
        *ctx.camera = Camera::from(&config.camera);
        *ctx.light = SpotLight::from(&config.light);
        ctx.background(Color::BLACK);

        let mut planet = Planet::new(ctx, &config.planet, &config.atmosphere);

        let helper = config.debug.light_helper.then(|| ctx.light_helper(32));
        let helper_material = Material::basic(ctx.light.color);

        move |frame| {
            planet.advance();
            planet.draw(frame);

            if frame.frame_index % 600 == 0 {
                tracing::debug!(
                    frame = frame.frame_index,
                    fps = frame.fps(),
                    angle = planet.orientation().angle_from_identity(),
                    "planet spinning"
                );
            }

            if let Some(helper) = helper {
                frame.draw_mesh(helper, Transform::new(), helper_material);
            }
        }
    })
}
