//! # 数据变换链
//!
//! ## 设计思路
//!
//! 用户可以注册任意个“JSON 变换函数”，在提取之前对解析结果做修改或补充字段。
//! 所有函数收敛到同一个函数式接口，按注册顺序调用；
//! 第一个失败立即中止本轮周期，后续变换不再执行，错误原样透传。

use serde_json::Value;

use crate::error::{PortalError, PortalResult, TransformFailure};

/// 单个变换函数：就地修改解析后的 JSON。
pub type JsonTransform = Box<dyn FnMut(&mut Value) -> Result<(), TransformFailure>>;

/// 有序变换链。
#[derive(Default)]
pub struct TransformChain {
    transforms: Vec<JsonTransform>,
}

impl TransformChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个变换，调用顺序与注册顺序一致。
    pub fn push<F>(&mut self, transform: F)
    where
        F: FnMut(&mut Value) -> Result<(), TransformFailure> + 'static,
    {
        self.transforms.push(Box::new(transform));
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// 依次执行所有变换。
    pub fn apply(&mut self, data: &mut Value) -> PortalResult<()> {
        for (index, transform) in self.transforms.iter_mut().enumerate() {
            if let Err(source) = transform(data) {
                log::warn!("⚠️ 第 {} 个数据变换失败：{}", index, source);
                return Err(PortalError::Transform { index, source });
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for TransformChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformChain")
            .field("len", &self.transforms.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn transforms_run_in_registration_order() {
        let mut chain = TransformChain::new();
        chain.push(|data| {
            data["trail"] = json!("a");
            Ok(())
        });
        chain.push(|data| {
            let previous = data["trail"].as_str().unwrap_or_default().to_string();
            data["trail"] = json!(format!("{previous}b"));
            Ok(())
        });

        let mut data = json!({});
        chain.apply(&mut data).expect("chain should succeed");
        assert_eq!(data["trail"], json!("ab"));
    }

    #[test]
    fn first_failure_skips_remaining_transforms() {
        let later_calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&later_calls);

        let mut chain = TransformChain::new();
        chain.push(|_| Ok(()));
        chain.push(|_| Err("field missing".into()));
        chain.push(move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });

        let err = chain.apply(&mut json!({})).unwrap_err();
        match err {
            PortalError::Transform { index, source } => {
                assert_eq!(index, 1);
                assert_eq!(source.to_string(), "field missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(later_calls.get(), 0);
    }
}
