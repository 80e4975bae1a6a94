use argh::FromArgs;
use std::path::PathBuf;

use convnd::{
    conv::{
        explicit::convolve_2d_with,
        filter::{gaussian_gradient_2d, gaussian_sharpening, gaussian_smoothing},
        kernels::box_kernel_1d,
        normalize::normalize_after_convolution,
        promotion::promote_kernel_to_full_2d,
        BorderTreatment, KernelOptions2D,
    },
    io::functional as F,
    tensor::Tensor,
};

#[derive(FromArgs)]
/// Convolve an image file with one of the built-in filters
struct Args {
    /// path to the input image
    #[argh(option, short = 'i')]
    input: PathBuf,

    /// path to the output image
    #[argh(option, short = 'o')]
    output: PathBuf,

    /// the filter to apply: gaussian, sharpen, box or gradient
    #[argh(option, default = "String::from(\"gaussian\")")]
    filter: String,

    /// the standard deviation of the gaussian filters
    #[argh(option, default = "1.0")]
    sigma: f64,

    /// the sharpening factor
    #[argh(option, default = "1.0")]
    factor: f64,

    /// the box kernel size
    #[argh(option, default = "3")]
    size: usize,

    /// kernel options for the box filter as json, e.g. '{"y": {"stride": 2}, "x": {"stride": 2}}'
    #[argh(option)]
    options: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let image: Tensor<f32, 3> = F::read_image(&args.input)?;
    let [height, width, channels] = image.shape;
    log::info!("loaded {height}x{width} image with {channels} channels");

    let output = match args.filter.to_lowercase().as_str() {
        "gaussian" => gaussian_smoothing::<_, f32, 3>(&image, &[args.sigma, args.sigma])?,
        "sharpen" => gaussian_sharpening::<_, f32, 3>(&image, args.factor, args.sigma)?,
        "box" => {
            let options = match &args.options {
                Some(json) => serde_json::from_str::<KernelOptions2D>(json)?,
                None => KernelOptions2D::default()
                    .with_padding(args.size / 2)
                    .with_border_treatment(BorderTreatment::Repeat),
            };
            log::info!("box options: {options}");
            let kernel = promote_kernel_to_full_2d(&box_kernel_1d::<f32>(args.size), channels)?;
            convolve_2d_with(&image, &kernel, &options)?
        }
        "gradient" => {
            let (gy, gx) = gaussian_gradient_2d::<_, f32>(&image, args.sigma)?;
            let magnitude = Tensor::from_shape_vec(
                gx.shape,
                gy.iter().zip(gx.iter()).map(|(y, x)| y.hypot(*x)).collect(),
            )?;
            // stretch the magnitude onto [0, 1]
            normalize_after_convolution(&magnitude)?
        }
        _ => {
            return Err(format!("Invalid filter: {}", args.filter).into());
        }
    };

    F::write_image(&args.output, &output)?;
    log::info!(
        "wrote {}x{} result to {}",
        output.shape[0],
        output.shape[1],
        args.output.display()
    );

    Ok(())
}
