//! 服务注册表抽象接口

use crate::descriptor::ServiceDescriptor;
use infrastructure_common::TypeInfo;

/// 提交模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationMode {
    /// 追加（同一服务类型允许多个实现）
    Append,
    /// 替换该服务类型的所有已有描述符
    Replace,
}

/// 服务注册表 trait
///
/// 组合过程中容器作为可变的构建目标，只需要支持追加和替换两种写操作。
pub trait ServiceRegistry {
    /// 追加描述符
    fn add(&mut self, descriptor: ServiceDescriptor);

    /// 移除服务类型的所有已有描述符并安装新描述符，返回被移除的数量
    fn replace(&mut self, descriptor: ServiceDescriptor) -> usize;

    /// 按注册顺序返回所有描述符
    fn descriptors(&self) -> &[ServiceDescriptor];

    /// 按注册顺序返回某个服务类型的描述符
    fn descriptors_for(&self, service: TypeInfo) -> Vec<&ServiceDescriptor> {
        self.descriptors()
            .iter()
            .filter(|d| d.service == service)
            .collect()
    }

    /// 服务类型是否已注册
    fn is_registered(&self, service: TypeInfo) -> bool {
        self.descriptors().iter().any(|d| d.service == service)
    }

    /// 按模式提交描述符
    fn submit(&mut self, descriptor: ServiceDescriptor, mode: RegistrationMode) {
        match mode {
            RegistrationMode::Append => self.add(descriptor),
            RegistrationMode::Replace => {
                self.replace(descriptor);
            }
        }
    }

    /// 描述符数量
    fn len(&self) -> usize {
        self.descriptors().len()
    }

    /// 是否为空
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
