use ndarray::Array4;

/// Input width the model was trained with.
pub const TARGET_WIDTH: u32 = 150;
/// Input height the model was trained with.
pub const TARGET_HEIGHT: u32 = 150;

/// Preprocess a single decoded image into the tensor the model expects.
///
/// It will always add a batch dimension equal to 1 to the result.
pub fn preprocessing(image: &image::DynamicImage) -> Array4<f32> {
    // call single_preprocessing on the image and add a batch dimension
    single_preprocessing(image).insert_axis(ndarray::Axis(0))
}

/// Preprocess one image: resize to the training resolution and rescale the
/// pixel intensities into [0, 1].
///
/// The model is channels-last, so the result is laid out [height, width, 3].
/// Nearest-neighbor interpolation matches the resize used at training time
/// and must not be changed independently of the artifact.
fn single_preprocessing(image: &image::DynamicImage) -> ndarray::Array3<f32> {
    let resized = image
        .resize_exact(
            TARGET_WIDTH,
            TARGET_HEIGHT,
            image::imageops::FilterType::Nearest,
        )
        .to_rgb8();

    ndarray::Array3::from_shape_fn(
        (TARGET_HEIGHT as usize, TARGET_WIDTH as usize, 3),
        |(y, x, c)| resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    #[test]
    fn preprocessing_produces_batched_channels_last_tensor() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(640, 480, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        }));

        let tensor = preprocessing(&image);

        assert_eq!(
            tensor.shape(),
            [1, TARGET_HEIGHT as usize, TARGET_WIDTH as usize, 3]
        );
        assert!(tensor.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn preprocessing_rescales_full_intensity_to_one() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            32,
            32,
            image::Rgb([255, 0, 255]),
        ));

        let tensor = preprocessing(&image);

        assert_eq!(tensor[[0, 0, 0, 0]], 1.0);
        assert_eq!(tensor[[0, 0, 0, 1]], 0.0);
        assert_eq!(tensor[[0, 0, 0, 2]], 1.0);
    }
}
