mod shape;

use crate::tensor::Tensor;

#[test]
fn test_new_checks_data_length() {
    assert!(Tensor::new(&[1.0, 2.0, 3.0], &[2, 2]).is_err());
    let t = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
    assert_eq!(t.get(&[1, 0]), Some(3.0));
    assert_eq!(t.get(&[2, 0]), None);
    assert_eq!(t.dimension(), 2);
    assert_eq!(t.size(), 4);
}

#[test]
fn test_scalar_number() {
    assert_eq!(Tensor::scalar(2.5).number(), Some(2.5));
    assert_eq!(Tensor::scalar(2.5).shape(), &[1, 1]);
    assert_eq!(Tensor::ones(&[2, 1]).number(), None);
}

#[test]
fn test_uniform_and_normal_with_rng() {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    let mut rng = StdRng::seed_from_u64(0);
    let u = Tensor::uniform_with_rng(-0.05, 0.05, &[20, 20], &mut rng);
    assert!(u.all(|x| (-0.05..=0.05).contains(&x)));

    let n = Tensor::normal_with_rng(1.0, 2.0, &[100, 100], &mut rng);
    assert!(n.all(f32::is_finite));
    let mean = n.mean_all();
    assert!((mean - 1.0).abs() < 0.1, "均值偏离过大：{mean}");

    let mut rng_again = StdRng::seed_from_u64(0);
    assert_eq!(
        Tensor::uniform_with_rng(-0.05, 0.05, &[20, 20], &mut rng_again),
        u
    );
}
