use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use half::f16;
use vectorize::{
    ArrayView, Dtype, ErrorKind, VectorizeOptions, array::dlpack, try_vectorize2,
    try_vectorize2_with, vectorize1, vectorize1_with, vectorize2, vectorize2_with, vectorize3,
    vectorize4,
};

struct Calc {
    offset: f64,
}

impl Calc {
    fn combine(&self, a: f64, b: f64) -> f64 {
        a + b + self.offset
    }

    fn checked_ratio(&self, a: f64, b: f64) -> Result<f64, RatioError> {
        if b == 0.0 {
            Err(RatioError::DivisionByZero { numerator: a })
        } else {
            Ok(a / b)
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum RatioError {
    #[error("division of {numerator} by zero")]
    DivisionByZero { numerator: f64 },
}

fn counting_options() -> (VectorizeOptions, Arc<AtomicUsize>) {
    let releases = Arc::new(AtomicUsize::new(0));
    let counter = releases.clone();
    let options = VectorizeOptions::new().with_release_hook(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (options, releases)
}

#[test]
fn test_combine() {
    let combine = vectorize2(Calc::combine);
    let a = [1.0, 2.0, 3.0, 4.0, 5.0];
    let b = [10.0, 20.0, 30.0, 40.0, 50.0];
    let out = combine(
        &Calc { offset: 0.0 },
        &ArrayView::from_vec_slice(&a),
        &ArrayView::from_vec_slice(&b),
    )
    .unwrap();
    assert_eq!(out.dtype(), Dtype::F64);
    assert_eq!(out.shape(), &[5]);
    assert_eq!(out.to_vec::<f64>().unwrap(), vec![11.0, 22.0, 33.0, 44.0, 55.0]);
    assert_eq!(out.get::<f64>(-1).unwrap(), 55.0);
}

#[test]
fn test_shape_mismatch_allocates_nothing() {
    let (options, releases) = counting_options();
    let combine = vectorize2_with(
        |_: &Calc, _: f64, _: f64| -> f64 { panic!("method must not be invoked") },
        options,
    );
    let a = [1.0; 5];
    let b = [1.0; 3];
    let e = combine(
        &Calc { offset: 0.0 },
        &ArrayView::from_vec_slice(&a),
        &ArrayView::from_vec_slice(&b),
    )
    .unwrap_err();
    match e.kind() {
        ErrorKind::ShapeMismatch {
            position,
            expected,
            actual,
        } => {
            assert_eq!(*position, 1);
            assert_eq!(expected, &[5]);
            assert_eq!(actual, &[3]);
        }
        kind => panic!("unexpected kind {kind:?}"),
    }
    assert_eq!(releases.load(Ordering::SeqCst), 0);
}

#[test]
fn test_rank_mismatch() {
    let combine = vectorize2(Calc::combine);
    let data = [0.0; 4];
    let a = ArrayView::from_slice(&data, &[4]).unwrap();
    let b = ArrayView::from_slice(&data, &[2, 2]).unwrap();
    let e = combine(&Calc { offset: 0.0 }, &a, &b).unwrap_err();
    assert!(e.is_shape_mismatch());
}

#[test]
fn test_rank_zero() {
    let combine = vectorize2(Calc::combine);
    let calc = Calc { offset: 0.0 };
    let x = [2.0];
    let y = [4.0];
    let a = ArrayView::from_slice(&x, &[]).unwrap();
    let b = ArrayView::from_slice(&y, &[]).unwrap();
    let out = combine(&calc, &a, &b).unwrap();
    assert_eq!(out.ndim(), 0);
    assert_eq!(out.len(), 1);
    assert_eq!(out.to_vec::<f64>().unwrap(), vec![6.0]);

    let c = ArrayView::from_slice(&y, &[1]).unwrap();
    let e = combine(&calc, &a, &c).unwrap_err();
    match e.kind() {
        ErrorKind::ShapeMismatch {
            position,
            expected,
            actual,
        } => {
            assert_eq!(*position, 1);
            assert!(expected.is_empty());
            assert_eq!(actual, &[1]);
        }
        kind => panic!("unexpected kind {kind:?}"),
    }
}

#[test]
fn test_dtype_mismatch_at_each_position() {
    let combine = vectorize2(Calc::combine);
    let f = [1.0f64; 3];
    let i = [1i64; 3];
    let f = ArrayView::from_vec_slice(&f);
    let i = ArrayView::from_vec_slice(&i);
    let calc = Calc { offset: 0.0 };

    for (a, b, bad) in [(&i, &f, 0), (&f, &i, 1)] {
        let e = combine(&calc, a, b).unwrap_err();
        match e.kind() {
            ErrorKind::DtypeMismatch {
                position,
                expected,
                actual,
            } => {
                assert_eq!(*position, bad);
                assert_eq!(*expected, Dtype::F64);
                assert_eq!(*actual, Dtype::I64);
            }
            kind => panic!("unexpected kind {kind:?}"),
        }
    }
}

#[test]
fn test_release_once_on_success() {
    let (options, releases) = counting_options();
    let combine = vectorize2_with(Calc::combine, options);
    let a = [1.0, 2.0];
    let out = combine(
        &Calc { offset: 1.0 },
        &ArrayView::from_vec_slice(&a),
        &ArrayView::from_vec_slice(&a),
    )
    .unwrap();
    assert_eq!(releases.load(Ordering::SeqCst), 0);
    drop(out);
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[test]
fn test_method_failure_propagates() {
    let (options, releases) = counting_options();
    let ratio = try_vectorize2_with(Calc::checked_ratio, options);
    let a = [1.0, 2.0, 3.0];
    let b = [1.0, 0.0, 3.0];
    let e = ratio(
        &Calc { offset: 0.0 },
        &ArrayView::from_vec_slice(&a),
        &ArrayView::from_vec_slice(&b),
    )
    .unwrap_err();
    match e.kind() {
        ErrorKind::Method { source } => {
            let source = source.downcast_ref::<RatioError>().unwrap();
            assert!(matches!(
                source,
                RatioError::DivisionByZero { numerator } if *numerator == 2.0
            ));
        }
        kind => panic!("unexpected kind {kind:?}"),
    }
    assert!(std::error::Error::source(&e).is_some());
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[test]
fn test_fallible_success() {
    let ratio = try_vectorize2(Calc::checked_ratio);
    let a = [1.0, 9.0];
    let b = [4.0, 3.0];
    let out = ratio(
        &Calc { offset: 0.0 },
        &ArrayView::from_vec_slice(&a),
        &ArrayView::from_vec_slice(&b),
    )
    .unwrap();
    assert_eq!(out.to_vec::<f64>().unwrap(), vec![0.25, 3.0]);
}

#[test]
fn test_idempotent_calls() {
    let (options, releases) = counting_options();
    let combine = vectorize2_with(Calc::combine, options);
    let calc = Calc { offset: 0.5 };
    let a = [1.0, 2.0, 3.0];
    let a = ArrayView::from_vec_slice(&a);

    let first = combine(&calc, &a, &a).unwrap();
    let second = combine(&calc, &a, &a).unwrap();
    assert_eq!(first.to_vec::<f64>().unwrap(), second.to_vec::<f64>().unwrap());
    assert_ne!(
        first.view().as_ptr(),
        second.view().as_ptr(),
        "each call owns a distinct buffer"
    );
    drop(first);
    assert_eq!(releases.load(Ordering::SeqCst), 1);
    assert_eq!(second.to_vec::<f64>().unwrap(), vec![2.5, 4.5, 6.5]);
    drop(second);
    assert_eq!(releases.load(Ordering::SeqCst), 2);
}

#[test]
fn test_mixed_layouts_pair_logical_elements() {
    // Logical 2x3 matrix [[0, 1, 2], [3, 4, 5]] in C and Fortran order.
    let c = [0i32, 1, 2, 3, 4, 5];
    let f = [0i32, 3, 1, 4, 2, 5];
    let c = ArrayView::from_slice(&c, &[2, 3]).unwrap();
    let f = ArrayView::from_slice_strided(&f, &[2, 3], &[1, 2], 0).unwrap();

    let diff = vectorize2(|_: &(), a: i32, b: i32| a - b);
    let out = diff(&(), &c, &f).unwrap();
    assert_eq!(out.to_vec::<i32>().unwrap(), vec![0; 6]);
    assert_eq!(out.strides(), &[3, 1]);

    // The output follows the compact layout of the first input.
    let out = diff(&(), &f, &c).unwrap();
    assert_eq!(out.strides(), &[1, 2]);
    assert_eq!(out.to_vec::<i32>().unwrap(), vec![0; 6]);
}

#[test]
fn test_gapped_input_gives_row_major_output() {
    let data = [1u16, 0, 2, 0, 3, 0];
    let every_other = ArrayView::from_slice_strided(&data, &[3], &[2], 0).unwrap();
    let double = vectorize1(|_: &(), x: u16| x * 2);
    let out = double(&(), &every_other).unwrap();
    assert_eq!(out.strides(), &[1]);
    assert_eq!(out.nbytes(), 6);
    assert_eq!(out.to_vec::<u16>().unwrap(), vec![2, 4, 6]);
}

#[test]
fn test_max_bytes_rejects_before_invoking() {
    let (options, releases) = counting_options();
    let calls = AtomicUsize::new(0);
    let square = vectorize1_with(
        |calls: &AtomicUsize, x: f64| {
            calls.fetch_add(1, Ordering::SeqCst);
            x * x
        },
        options.with_max_bytes(16),
    );

    let small = [1.0, 2.0];
    let out = square(&calls, &ArrayView::from_vec_slice(&small)).unwrap();
    assert_eq!(out.to_vec::<f64>().unwrap(), vec![1.0, 4.0]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let large = [1.0; 3];
    let e = square(&calls, &ArrayView::from_vec_slice(&large)).unwrap_err();
    assert!(matches!(
        e.kind(),
        ErrorKind::AllocationFailure { bytes: Some(24) }
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    drop(out);
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[test]
fn test_arity_three_and_four() {
    struct Blend;

    let clamp = vectorize3(|_: &Blend, x: f32, lo: f32, hi: f32| x.clamp(lo, hi));
    let x = [-1.0f32, 0.5, 2.0];
    let lo = [0.0f32; 3];
    let hi = [1.0f32; 3];
    let out = clamp(
        &Blend,
        &ArrayView::from_vec_slice(&x),
        &ArrayView::from_vec_slice(&lo),
        &ArrayView::from_vec_slice(&hi),
    )
    .unwrap();
    assert_eq!(out.to_vec::<f32>().unwrap(), vec![0.0, 0.5, 1.0]);

    let select = vectorize4(|_: &Blend, mask: bool, a: i8, b: u64, scale: f64| {
        if mask { a as f64 * scale } else { b as f64 * scale }
    });
    let mask = [true, false];
    let a = [-3i8, 4];
    let b = [7u64, 9];
    let scale = [2.0f64, 0.5];
    let out = select(
        &Blend,
        &ArrayView::from_vec_slice(&mask),
        &ArrayView::from_vec_slice(&a),
        &ArrayView::from_vec_slice(&b),
        &ArrayView::from_vec_slice(&scale),
    )
    .unwrap();
    assert_eq!(out.to_vec::<f64>().unwrap(), vec![-6.0, 4.5]);
}

#[test]
fn test_bool_and_half_results() {
    let is_positive = vectorize1(|_: &(), x: i32| x > 0);
    let x = [-2, 0, 5];
    let out = is_positive(&(), &ArrayView::from_vec_slice(&x)).unwrap();
    assert_eq!(out.dtype(), Dtype::BOOL);
    assert_eq!(out.to_vec::<bool>().unwrap(), vec![false, false, true]);

    let narrow = vectorize1(|_: &(), x: f32| f16::from_f32(x));
    let x = [0.5f32, -2.0];
    let out = narrow(&(), &ArrayView::from_vec_slice(&x)).unwrap();
    assert_eq!(out.dtype(), Dtype::F16);
    assert_eq!(
        out.to_vec::<f16>().unwrap(),
        vec![f16::from_f32(0.5), f16::from_f32(-2.0)]
    );
}

#[test]
fn test_random_inputs() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    let combine = vectorize2(Calc::combine);
    let calc = Calc { offset: 0.25 };
    for _ in 0..50 {
        let rows = rng.usize(0..8);
        let cols = rng.usize(1..8);
        let a: Vec<f64> = (0..rows * cols).map(|_| rng.f64()).collect();
        let b: Vec<f64> = (0..rows * cols).map(|_| rng.f64()).collect();
        let va = ArrayView::from_slice(&a, &[rows, cols]).unwrap();
        let vb = ArrayView::from_slice(&b, &[rows, cols]).unwrap();
        let out = combine(&calc, &va, &vb).unwrap();
        let expected: Vec<f64> = a.iter().zip(&b).map(|(x, y)| x + y + 0.25).collect();
        assert_eq!(out.shape(), &[rows, cols]);
        assert_eq!(out.to_vec::<f64>().unwrap(), expected);
    }
}

#[test]
fn test_random_shape_mismatch() {
    let mut rng = fastrand::Rng::with_seed(42);
    let combine = vectorize2(Calc::combine);
    let calc = Calc { offset: 0.0 };
    for _ in 0..50 {
        let n = rng.usize(1..32);
        let mut m = rng.usize(1..32);
        if m == n {
            m += 1;
        }
        let a = vec![0.0; n];
        let b = vec![0.0; m];
        let e = combine(
            &calc,
            &ArrayView::from_vec_slice(&a),
            &ArrayView::from_vec_slice(&b),
        )
        .unwrap_err();
        assert!(e.is_shape_mismatch());
    }
}

#[test]
fn test_dlpack_round_trip() {
    let (options, releases) = counting_options();
    let options = options.with_alignment(128);
    let combine = vectorize2_with(Calc::combine, options);
    let a = [1.0, 2.0, 3.0, 4.0];
    let a = ArrayView::from_slice(&a, &[2, 2]).unwrap();
    let out = combine(&Calc { offset: 0.0 }, &a, &a).unwrap();

    let managed = out.into_dlpack().unwrap();
    assert_eq!(releases.load(Ordering::SeqCst), 0);

    // Feed the exported tensor back in as an input.
    let tensor = unsafe { &managed.as_ref().dl_tensor };
    let doubled = unsafe { ArrayView::from_dl_tensor(tensor) }.unwrap();
    assert_eq!(doubled.as_ptr() as usize % 128, 0);
    let again = combine(&Calc { offset: 0.0 }, &doubled, &doubled).unwrap();
    assert_eq!(again.to_vec::<f64>().unwrap(), vec![4.0, 8.0, 12.0, 16.0]);

    unsafe { dlpack::release(managed) };
    assert_eq!(releases.load(Ordering::SeqCst), 1);
    drop(again);
    assert_eq!(releases.load(Ordering::SeqCst), 2);
}
