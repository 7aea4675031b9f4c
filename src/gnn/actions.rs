/*
 * @Author       : 老董
 * @Date         : 2026-03-13
 * @Description  : Human3.6M的动作标签，以及评估时固定种子的起始下标生成
 */

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::errors::ModelError;
use crate::tensor::Tensor;

pub const ACTIONS: [&str; 15] = [
    "directions",
    "discussion",
    "eating",
    "greeting",
    "phoning",
    "posing",
    "purchases",
    "sitting",
    "sittingdown",
    "smoking",
    "takingphoto",
    "waiting",
    "walking",
    "walkingdog",
    "walkingtogether",
];

/// 评估序列起始下标的默认种子
pub const SRNN_SEED: u64 = 1_234_567_890;

/// 每个评估样本前后各需要的帧数
const SRNN_PREFIX: usize = 50;
const SRNN_SUFFIX: usize = 100;
/// 起始下标的下界
const SRNN_MIN_START: usize = 16;
/// 每个动作评估的样本数
const SRNN_NUM_SEEDS: usize = 8;

pub fn action_index(label: &str) -> Result<usize, ModelError> {
    ACTIONS
        .iter()
        .position(|&a| a == label)
        .ok_or_else(|| ModelError::UnknownAction(label.to_string()))
}

/// "all"返回全部动作，否则返回只含该动作的列表
pub fn define_actions(label: &str) -> Result<Vec<&'static str>, ModelError> {
    if label == "all" {
        return Ok(ACTIONS.to_vec());
    }
    Ok(vec![ACTIONS[action_index(label)?]])
}

/// 形状为[ACTIONS.len()]的独热向量
pub fn action_one_hot(label: &str) -> Result<Tensor, ModelError> {
    let mut data = [0.0; ACTIONS.len()];
    data[action_index(label)?] = 1.0;
    Ok(Tensor::new(&data, &[ACTIONS.len()])?)
}

/// 生成8个评估起始下标，依次交替取自长度为`t1`、`t2`的两段子序列，
/// 每个下标均匀取自[16, T - 150)。同一组参数总是给出同样的结果
pub fn srnn_seed_indices(
    seed: u64,
    t1: usize,
    t2: usize,
) -> Result<[usize; SRNN_NUM_SEEDS], ModelError> {
    let required = SRNN_MIN_START + SRNN_PREFIX + SRNN_SUFFIX + 1;
    if let Some(&len) = [t1, t2].iter().find(|&&t| t < required) {
        return Err(ModelError::SequenceTooShort { len, required });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices = [0; SRNN_NUM_SEEDS];
    for (i, index) in indices.iter_mut().enumerate() {
        let len = if i % 2 == 0 { t1 } else { t2 };
        *index = rng.gen_range(SRNN_MIN_START..len - SRNN_PREFIX - SRNN_SUFFIX);
    }
    Ok(indices)
}
