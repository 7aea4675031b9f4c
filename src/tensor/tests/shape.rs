use crate::errors::TensorError;
use crate::tensor::Tensor;

fn arange(shape: &[usize]) -> Tensor {
    let size: usize = shape.iter().product();
    let data: Vec<f32> = (0..size).map(|i| i as f32).collect();
    Tensor::new(&data, shape).unwrap()
}

#[test]
fn test_reshape_and_permute() {
    let t = arange(&[2, 3]);
    assert_eq!(t.reshape(&[3, 2]).unwrap().get(&[2, 1]), Some(5.0));
    assert!(t.reshape(&[4, 2]).is_err());

    let p = arange(&[2, 3, 4]).permute(&[2, 0, 1]).unwrap();
    assert_eq!(p.shape(), &[4, 2, 3]);
    assert_eq!(p.get(&[3, 1, 2]), Some(23.0));
    assert_eq!(
        arange(&[2, 3]).permute(&[0, 0]),
        Err(TensorError::PermuteNeedUniqueAndInRange)
    );
    assert_eq!(t.transpose().unwrap().get(&[2, 0]), Some(2.0));
}

#[test]
fn test_narrow_and_embed_into() {
    let t = arange(&[2, 4]);
    let n = t.narrow(1, 1, 2).unwrap();
    assert_eq!(n, Tensor::new(&[1.0, 2.0, 5.0, 6.0], &[2, 2]).unwrap());
    assert!(matches!(
        t.narrow(1, 3, 2),
        Err(TensorError::RangeOutOfBounds { axis: 1, .. })
    ));

    let back = n.embed_into(&[2, 4], 1, 1).unwrap();
    assert_eq!(
        back,
        Tensor::new(&[0.0, 1.0, 2.0, 0.0, 0.0, 5.0, 6.0, 0.0], &[2, 4]).unwrap()
    );
}

#[test]
fn test_index_select_and_scatter_add() {
    let t = arange(&[2, 3]);
    let s = t.index_select(1, &[2, 2, 0]).unwrap();
    assert_eq!(s, Tensor::new(&[2.0, 2.0, 0.0, 5.0, 5.0, 3.0], &[2, 3]).unwrap());
    assert!(t.index_select(1, &[3]).is_err());

    let grad = Tensor::ones(&[2, 3]);
    let scattered = grad.index_scatter_add(&[2, 3], 1, &[2, 2, 0]).unwrap();
    assert_eq!(
        scattered,
        Tensor::new(&[1.0, 0.0, 2.0, 1.0, 0.0, 2.0], &[2, 3]).unwrap()
    );
}

#[test]
fn test_concat() {
    let a = arange(&[2, 1]);
    let b = Tensor::full(9.0, &[2, 2]);
    let c = Tensor::concat(&[&a, &b], 1).unwrap();
    assert_eq!(c, Tensor::new(&[0.0, 9.0, 9.0, 1.0, 9.0, 9.0], &[2, 3]).unwrap());
    assert_eq!(Tensor::concat(&[], 0), Err(TensorError::EmptyList));
    assert!(Tensor::concat(&[&a, &Tensor::zeros(&[3, 1])], 1).is_err());
}
